//! Climatology rows as handed to the persistence layer.
//!
//! The column order of [`ClimoMonthRow::to_cells`] is a fixed contract: the store
//! writes the cells positionally under [`CLIMO_COLUMNS`].

use crate::types::monthly_aggregate::{CountKind, Metric, RecordKind};
use crate::types::record_pair::RecordPair;
use serde::{Deserialize, Serialize};

/// How a statistic rolls up from twelve month rows into the annual row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnualRollup {
    /// Intensity-type values are averaged.
    Mean,
    /// Amount-type values are summed.
    Sum,
}

/// The thirteen statistics of a climatology row, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClimoStat {
    MeanTmax,
    MeanTmin,
    MeanTemperature,
    MeanDewPoint,
    MeanHumidity,
    MeanPressure,
    MeanCloudCover,
    MeanWindSpeed,
    TotalPrecipitation,
    TotalRain,
    TotalSnowfall,
    TotalSunshine,
    WetDays,
}

/// Where a climatology statistic comes from inside a monthly aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatSource {
    Metric(Metric),
    Count(CountKind),
}

impl ClimoStat {
    pub const COUNT: usize = 13;

    pub const ALL: [ClimoStat; ClimoStat::COUNT] = [
        ClimoStat::MeanTmax,
        ClimoStat::MeanTmin,
        ClimoStat::MeanTemperature,
        ClimoStat::MeanDewPoint,
        ClimoStat::MeanHumidity,
        ClimoStat::MeanPressure,
        ClimoStat::MeanCloudCover,
        ClimoStat::MeanWindSpeed,
        ClimoStat::TotalPrecipitation,
        ClimoStat::TotalRain,
        ClimoStat::TotalSnowfall,
        ClimoStat::TotalSunshine,
        ClimoStat::WetDays,
    ];

    pub fn source(self) -> StatSource {
        match self {
            ClimoStat::MeanTmax => StatSource::Metric(Metric::TemperatureMax),
            ClimoStat::MeanTmin => StatSource::Metric(Metric::TemperatureMin),
            ClimoStat::MeanTemperature => StatSource::Metric(Metric::TemperatureMean),
            ClimoStat::MeanDewPoint => StatSource::Metric(Metric::DewPoint),
            ClimoStat::MeanHumidity => StatSource::Metric(Metric::Humidity),
            ClimoStat::MeanPressure => StatSource::Metric(Metric::Pressure),
            ClimoStat::MeanCloudCover => StatSource::Metric(Metric::CloudCover),
            ClimoStat::MeanWindSpeed => StatSource::Metric(Metric::WindSpeed),
            ClimoStat::TotalPrecipitation => StatSource::Metric(Metric::Precipitation),
            ClimoStat::TotalRain => StatSource::Metric(Metric::Rain),
            ClimoStat::TotalSnowfall => StatSource::Metric(Metric::Snowfall),
            ClimoStat::TotalSunshine => StatSource::Metric(Metric::Sunshine),
            ClimoStat::WetDays => StatSource::Count(CountKind::WetDays),
        }
    }

    pub fn annual_rollup(self) -> AnnualRollup {
        match self.source() {
            StatSource::Metric(metric) if metric.is_total() => AnnualRollup::Sum,
            StatSource::Metric(_) => AnnualRollup::Mean,
            StatSource::Count(_) => AnnualRollup::Sum,
        }
    }

    pub fn column_name(self) -> &'static str {
        match self {
            ClimoStat::MeanTmax => "mean_tmax",
            ClimoStat::MeanTmin => "mean_tmin",
            ClimoStat::MeanTemperature => "mean_temp",
            ClimoStat::MeanDewPoint => "mean_dew_point",
            ClimoStat::MeanHumidity => "mean_humidity",
            ClimoStat::MeanPressure => "mean_pressure",
            ClimoStat::MeanCloudCover => "mean_cloud_cover",
            ClimoStat::MeanWindSpeed => "mean_wind_speed",
            ClimoStat::TotalPrecipitation => "total_precip",
            ClimoStat::TotalRain => "total_rain",
            ClimoStat::TotalSnowfall => "total_snow",
            ClimoStat::TotalSunshine => "total_sunshine_hours",
            ClimoStat::WetDays => "wet_days",
        }
    }
}

/// Column headers matching [`ClimoMonthRow::to_cells`], in order.
pub const CLIMO_COLUMNS: [&str; 27] = [
    "label",
    "mean_tmax",
    "mean_tmin",
    "mean_temp",
    "mean_dew_point",
    "mean_humidity",
    "mean_pressure",
    "mean_cloud_cover",
    "mean_wind_speed",
    "total_precip",
    "total_rain",
    "total_snow",
    "total_sunshine_hours",
    "wet_days",
    "years",
    "warmest_month_mean",
    "coldest_month_mean",
    "wettest_month_total",
    "wettest_month_year",
    "record_high_tmax",
    "record_high_tmax_date",
    "record_low_tmin",
    "record_low_tmin_date",
    "record_max_24h_precip",
    "record_max_24h_precip_date",
    "record_max_24h_snow",
    "record_max_24h_snow_date",
];

/// A single spreadsheet-style cell value, as read from or written to the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, Cell::from)
    }
}

/// One row of a climatology window: a month of year, or the annual summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimoMonthRow {
    pub label: String,
    pub stats: [Option<f64>; ClimoStat::COUNT],
    pub year_count: u32,
    pub warmest_mean: Option<f64>,
    pub coldest_mean: Option<f64>,
    pub wettest_total: Option<f64>,
    pub wettest_year: Option<i32>,
    pub record_high_tmax: RecordPair,
    pub record_low_tmin: RecordPair,
    pub record_max_24h_precip: RecordPair,
    pub record_max_24h_snow: RecordPair,
}

impl ClimoMonthRow {
    /// A row with nothing in it but its label.
    pub fn blank(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            stats: [None; ClimoStat::COUNT],
            year_count: 0,
            warmest_mean: None,
            coldest_mean: None,
            wettest_total: None,
            wettest_year: None,
            record_high_tmax: RecordPair::empty(),
            record_low_tmin: RecordPair::empty(),
            record_max_24h_precip: RecordPair::empty(),
            record_max_24h_snow: RecordPair::empty(),
        }
    }

    pub fn stat(&self, stat: ClimoStat) -> Option<f64> {
        self.stats[stat as usize]
    }

    pub fn records(&self) -> [&RecordPair; 4] {
        [
            &self.record_high_tmax,
            &self.record_low_tmin,
            &self.record_max_24h_precip,
            &self.record_max_24h_snow,
        ]
    }

    /// The row's record for `kind`; rows carry no rain record.
    pub fn record(&self, kind: RecordKind) -> Option<&RecordPair> {
        match kind {
            RecordKind::HighTmax => Some(&self.record_high_tmax),
            RecordKind::LowTmin => Some(&self.record_low_tmin),
            RecordKind::MaxPrecipitation => Some(&self.record_max_24h_precip),
            RecordKind::MaxSnowfall => Some(&self.record_max_24h_snow),
            RecordKind::MaxRain => None,
        }
    }

    pub fn record_mut(&mut self, kind: RecordKind) -> Option<&mut RecordPair> {
        match kind {
            RecordKind::HighTmax => Some(&mut self.record_high_tmax),
            RecordKind::LowTmin => Some(&mut self.record_low_tmin),
            RecordKind::MaxPrecipitation => Some(&mut self.record_max_24h_precip),
            RecordKind::MaxSnowfall => Some(&mut self.record_max_24h_snow),
            RecordKind::MaxRain => None,
        }
    }

    /// The row in persistence column order (see [`CLIMO_COLUMNS`]).
    pub fn to_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(CLIMO_COLUMNS.len());
        cells.push(Cell::from(self.label.as_str()));
        cells.extend(self.stats.iter().map(|s| Cell::from(*s)));
        cells.push(Cell::Number(f64::from(self.year_count)));
        cells.push(Cell::from(self.warmest_mean));
        cells.push(Cell::from(self.coldest_mean));
        cells.push(Cell::from(self.wettest_total));
        cells.push(Cell::from(self.wettest_year.map(f64::from)));
        for record in self.records() {
            cells.push(Cell::from(record.value()));
            cells.push(Cell::from(record.date()));
        }
        cells
    }
}

/// Statistics for one multi-year window. Fully recomputed on every request.
///
/// A window with no data in range has no rows and no annual row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimatologyWindow {
    pub start_year: i32,
    pub end_year: i32,
    pub rows: Vec<ClimoMonthRow>,
    pub annual_row: Option<ClimoMonthRow>,
}

impl ClimatologyWindow {
    pub fn empty(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
            rows: Vec::new(),
            annual_row: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `"1961-1990"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }

    /// Month rows followed by the annual row.
    pub fn all_rows(&self) -> impl Iterator<Item = &ClimoMonthRow> {
        self.rows.iter().chain(self.annual_row.iter())
    }
}
