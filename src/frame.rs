//! Conversion between Polars frames and the engine's row types.
//!
//! Daily observations come in as a frame with one date column (`date` or `time`,
//! string or `Date` typed) and one column per variable, named like the observation
//! source names them. Aggregates and windows go out as frames whose columns follow
//! the persistence layout.

use crate::types::climo_row::{ClimatologyWindow, Cell, CLIMO_COLUMNS};
use crate::types::monthly_aggregate::{CountKind, Metric, MonthlyAggregate, RecordKind};
use crate::types::observation::DailyObservation;
use crate::types::variable::VariableIndex;
use log::debug;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Accepted names for the date column, in lookup order.
pub const DATE_COLUMNS: [&str; 2] = ["date", "time"];

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("No date column found (expected one of {expected:?}, got {found:?})")]
    MissingDateColumn {
        expected: &'static [&'static str],
        found: Vec<String>,
    },
}

/// Decodes every row of `df` into a [`DailyObservation`].
///
/// Unknown columns are ignored, numeric columns of any width are read as `f64`, and a
/// null date produces an observation that later stages skip.
pub fn observations_from_frame(df: &DataFrame) -> Result<Vec<DailyObservation>, FrameError> {
    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let date_column = DATE_COLUMNS
        .iter()
        .find(|name| header.iter().any(|h| h == *name))
        .ok_or_else(|| FrameError::MissingDateColumn {
            expected: &DATE_COLUMNS,
            found: header.clone(),
        })?;

    // Datetime columns render with a time part, which is not an ISO date.
    let dates = df.column(date_column)?;
    let dates = match dates.dtype() {
        DataType::Datetime(..) => dates.cast(&DataType::Date)?,
        _ => dates.clone(),
    };
    let dates = dates.cast(&DataType::String)?;
    let dates = dates.str()?;

    let index = VariableIndex::from_header(&header);
    let mut values: Vec<(usize, Float64Chunked)> = Vec::new();
    for variable in index.variables() {
        let Some(position) = index.column_of(variable) else {
            continue;
        };
        let column = df.column(variable.api_name())?.cast(&DataType::Float64)?;
        values.push((position, column.f64()?.clone()));
    }
    debug!(
        "Reading {} row(s) with {} variable column(s) from frame",
        df.height(),
        values.len()
    );

    let mut row = vec![None; index.width()];
    let observations = (0..df.height())
        .map(|i| {
            for (position, column) in &values {
                row[*position] = column.get(i);
            }
            DailyObservation::from_row(&index, dates.get(i).unwrap_or_default(), &row)
        })
        .collect();
    Ok(observations)
}

/// Collects a lazy query and decodes it like [`observations_from_frame`].
pub fn observations_from_lazy(frame: LazyFrame) -> Result<Vec<DailyObservation>, FrameError> {
    observations_from_frame(&frame.collect()?)
}

/// Reads a CSV export of the observation source (header row required).
pub fn observations_from_csv(path: &Path) -> Result<Vec<DailyObservation>, FrameError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| FrameError::CsvRead(path.to_path_buf(), e))?;
    observations_from_frame(&df)
}

fn metric_column(metric: Metric) -> &'static str {
    match metric {
        Metric::TemperatureMax => "mean_tmax",
        Metric::TemperatureMin => "mean_tmin",
        Metric::TemperatureMean => "mean_temp",
        Metric::DewPoint => "mean_dew_point",
        Metric::Humidity => "mean_humidity",
        Metric::Pressure => "mean_pressure",
        Metric::CloudCover => "mean_cloud_cover",
        Metric::WindSpeed => "mean_wind_speed",
        Metric::Precipitation => "total_precip",
        Metric::Rain => "total_rain",
        Metric::Snowfall => "total_snow",
        Metric::Sunshine => "total_sunshine_hours",
        Metric::Daylight => "total_daylight_hours",
    }
}

fn count_column(kind: CountKind) -> &'static str {
    match kind {
        CountKind::WetDays => "wet_days",
        CountKind::RainyDays => "rainy_days",
        CountKind::SnowyDays => "snowy_days",
        CountKind::FrostDays => "frost_days",
    }
}

fn record_column(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::HighTmax => "record_high_tmax",
        RecordKind::LowTmin => "record_low_tmin",
        RecordKind::MaxPrecipitation => "record_max_24h_precip",
        RecordKind::MaxSnowfall => "record_max_24h_snow",
        RecordKind::MaxRain => "record_max_24h_rain",
    }
}

/// One row per aggregate: year, month, month name, every metric, every day count,
/// valid days and each record as a value/date column pair.
pub fn aggregates_to_frame(aggregates: &[MonthlyAggregate]) -> Result<DataFrame, FrameError> {
    let mut columns = vec![
        Column::new("year".into(), aggregates.iter().map(|a| a.year).collect::<Vec<_>>()),
        Column::new("month".into(), aggregates.iter().map(|a| a.month).collect::<Vec<_>>()),
        Column::new(
            "month_name".into(),
            aggregates
                .iter()
                .map(|a| a.key().month_name())
                .collect::<Vec<_>>(),
        ),
    ];
    for metric in Metric::MEANS.into_iter().chain(Metric::TOTALS) {
        columns.push(Column::new(
            metric_column(metric).into(),
            aggregates.iter().map(|a| a.value(metric)).collect::<Vec<_>>(),
        ));
    }
    for kind in CountKind::ALL {
        columns.push(Column::new(
            count_column(kind).into(),
            aggregates.iter().map(|a| a.count(kind)).collect::<Vec<_>>(),
        ));
    }
    columns.push(Column::new(
        "valid_days".into(),
        aggregates.iter().map(|a| a.valid_days).collect::<Vec<_>>(),
    ));
    for kind in RecordKind::ALL {
        let name = record_column(kind);
        columns.push(Column::new(
            name.into(),
            aggregates
                .iter()
                .map(|a| a.record(kind).value())
                .collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            format!("{name}_date").into(),
            aggregates
                .iter()
                .map(|a| a.record(kind).date())
                .collect::<Vec<_>>(),
        ));
    }
    Ok(DataFrame::new(columns)?)
}

fn is_text_column(name: &str) -> bool {
    name == "label" || name.ends_with("_date")
}

/// The month rows and the annual row of a window, with [`CLIMO_COLUMNS`] as header.
pub fn window_to_frame(window: &ClimatologyWindow) -> Result<DataFrame, FrameError> {
    let rows: Vec<Vec<Cell>> = window.all_rows().map(|r| r.to_cells()).collect();
    let columns = CLIMO_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cells = rows.iter().map(|row| row.get(i).cloned().unwrap_or_default());
            if is_text_column(name) {
                let text: Vec<Option<String>> = cells
                    .map(|cell| match cell {
                        Cell::Text(text) => Some(text),
                        Cell::Number(number) => Some(number.to_string()),
                        Cell::Empty => None,
                    })
                    .collect();
                Column::new((*name).into(), text)
            } else {
                let numbers: Vec<Option<f64>> = cells
                    .map(|cell| match cell {
                        Cell::Number(number) => Some(number),
                        _ => None,
                    })
                    .collect();
                Column::new((*name).into(), numbers)
            }
        })
        .collect::<Vec<_>>();
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climatology::builder::build_window;
    use crate::types::record_pair::RecordPair;
    use crate::types::variable::Variable;
    use chrono::NaiveDate;

    #[test]
    fn test_observations_from_frame() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!(
            "station" => ["a", "a", "a"],
            "time" => ["2020-03-01", "2020-03-02", "not a date"],
            "temperature_2m_max" => [30.0, 32.0, 28.0],
            "relative_humidity_2m_mean" => [Some(84.0), None, Some(0.5)],
            "snowfall_sum" => [0i64, 2, 0],
        )?;

        let observations = observations_from_frame(&df)?;
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].iso_date(), "2020-03-01");
        assert_eq!(observations[1].get(Variable::TemperatureMax), Some(32.0));
        assert_eq!(observations[1].get(Variable::HumidityMean), None);
        assert_eq!(observations[1].get(Variable::SnowfallSum), Some(2.0));
        assert_eq!(observations[0].get(Variable::RainSum), None);
        assert!(observations[2].parsed_date().is_none());
        Ok(())
    }

    #[test]
    fn test_date_typed_column_and_lazy_input() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!(
            "date" => [
                NaiveDate::from_ymd_opt(2021, 7, 4).unwrap(),
                NaiveDate::from_ymd_opt(2021, 7, 5).unwrap(),
            ],
            "precipitation_sum" => [1.5, 0.0],
        )?;
        assert_eq!(df.column("date")?.dtype(), &DataType::Date);
        let lazy = df.lazy().filter(col("precipitation_sum").gt(lit(0.0)));

        let observations = observations_from_lazy(lazy)?;
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].iso_date(), "2021-07-04");
        Ok(())
    }

    #[test]
    fn test_datetime_typed_column() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!(
            "time" => [
                NaiveDate::from_ymd_opt(2020, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
                NaiveDate::from_ymd_opt(2020, 3, 2).unwrap().and_hms_opt(12, 30, 0).unwrap(),
            ],
            "temperature_2m_min" => [-0.5, 1.0],
        )?;
        assert!(matches!(df.column("time")?.dtype(), DataType::Datetime(..)));

        let observations = observations_from_frame(&df)?;
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].iso_date(), "2020-03-01");
        assert_eq!(observations[1].iso_date(), "2020-03-02");
        assert!(observations.iter().all(|o| o.parsed_date().is_some()));
        assert_eq!(observations[0].get(Variable::TemperatureMin), Some(-0.5));
        Ok(())
    }

    #[test]
    fn test_observations_from_csv() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("daily.csv");
        std::fs::write(
            &path,
            "time,temperature_2m_max,precipitation_sum\n2020-07-01,25.5,50\n2020-07-02,,0.2\n",
        )?;

        let observations = observations_from_csv(&path)?;
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].get(Variable::PrecipitationSum), Some(50.0));
        assert_eq!(observations[1].get(Variable::TemperatureMax), None);

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            observations_from_csv(&missing),
            Err(FrameError::CsvRead(..))
        ));
        Ok(())
    }

    #[test]
    fn test_missing_date_column() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!("temperature_2m_max" => [1.0])?;
        let err = observations_from_frame(&df).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MissingDateColumn { ref found, .. } if found == &["temperature_2m_max"]
        ));
        Ok(())
    }

    #[test]
    fn test_aggregates_to_frame() -> Result<(), Box<dyn std::error::Error>> {
        let mut march = MonthlyAggregate::empty(2020, 3);
        march.means.insert(Metric::TemperatureMax, Some(30.0));
        march.record_high_tmax = RecordPair::new(32.0, "2nd Mar 2020");
        march.valid_days = Some(3);

        let df = aggregates_to_frame(&[march])?;
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("month_name")?.str()?.get(0), Some("March"));
        assert_eq!(df.column("mean_tmax")?.f64()?.get(0), Some(30.0));
        assert_eq!(df.column("total_precip")?.f64()?.get(0), None);
        assert_eq!(df.column("record_high_tmax_date")?.str()?.get(0), Some("2nd Mar 2020"));
        assert_eq!(df.column("valid_days")?.u32()?.get(0), Some(3));
        Ok(())
    }

    #[test]
    fn test_window_to_frame() -> Result<(), Box<dyn std::error::Error>> {
        let mut june = MonthlyAggregate::empty(1999, 6);
        june.means.insert(Metric::TemperatureMean, Some(16.0));
        june.record_low_tmin = RecordPair::new(3.5, "1st Jun 1999");
        let window = build_window(&[june], 1991, 2020, None);

        let df = window_to_frame(&window)?;
        let header: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();
        assert_eq!(header, CLIMO_COLUMNS);
        assert_eq!(df.height(), 13);
        assert_eq!(df.column("label")?.str()?.get(12), Some("Annual"));
        assert_eq!(df.column("mean_temp")?.f64()?.get(5), Some(16.0));
        assert_eq!(df.column("record_low_tmin_date")?.str()?.get(5), Some("1st Jun 1999"));

        let empty = window_to_frame(&ClimatologyWindow::empty(1961, 1990))?;
        assert_eq!(empty.height(), 0);
        assert_eq!(empty.width(), CLIMO_COLUMNS.len());
        Ok(())
    }
}
