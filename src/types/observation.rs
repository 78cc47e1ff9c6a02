use crate::types::period::YearMonth;
use crate::types::variable::{Variable, VariableIndex};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub(crate) const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// One station-day of weather observations.
///
/// Values are kept in a dense slot array indexed by [`Variable::slot`]. Missing and
/// non-finite inputs are stored as `None`, so every consumer sees a gap-tolerant series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    iso_date: String,
    values: [Option<f64>; Variable::COUNT],
}

impl DailyObservation {
    /// Creates an observation with every variable missing.
    pub fn new(iso_date: impl Into<String>) -> Self {
        Self {
            iso_date: iso_date.into(),
            values: [None; Variable::COUNT],
        }
    }

    /// Sets one variable, returning the updated observation.
    pub fn with(mut self, variable: Variable, value: impl Into<Option<f64>>) -> Self {
        self.set(variable, value.into());
        self
    }

    pub fn set(&mut self, variable: Variable, value: Option<f64>) {
        self.values[variable.slot()] = value.filter(|v| v.is_finite());
    }

    /// Decodes a source row using a prebuilt header index. Columns the index does not
    /// know, and positions past the end of `row`, are left missing.
    pub fn from_row(
        index: &VariableIndex,
        iso_date: impl Into<String>,
        row: &[Option<f64>],
    ) -> Self {
        let mut observation = Self::new(iso_date);
        for variable in index.variables() {
            let value = index
                .column_of(variable)
                .and_then(|column| row.get(column).copied().flatten());
            observation.set(variable, value);
        }
        observation
    }

    pub fn iso_date(&self) -> &str {
        &self.iso_date
    }

    pub fn get(&self, variable: Variable) -> Option<f64> {
        self.values[variable.slot()]
    }

    /// The calendar date, or `None` when the date string is malformed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.iso_date.trim(), ISO_DATE_FORMAT).ok()
    }

    pub fn year_month(&self) -> Option<YearMonth> {
        self.parsed_date()
            .map(|date| YearMonth::new(date.year(), date.month()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_values_are_stored_as_missing() {
        let obs = DailyObservation::new("2020-03-01")
            .with(Variable::TemperatureMax, f64::NAN)
            .with(Variable::TemperatureMin, f64::INFINITY)
            .with(Variable::PrecipitationSum, 1.5);

        assert_eq!(obs.get(Variable::TemperatureMax), None);
        assert_eq!(obs.get(Variable::TemperatureMin), None);
        assert_eq!(obs.get(Variable::PrecipitationSum), Some(1.5));
    }

    #[test]
    fn test_from_row_uses_header_positions() {
        let index =
            VariableIndex::from_header(&["precipitation_sum", "time", "temperature_2m_max"]);
        let obs = DailyObservation::from_row(&index, "2021-07-04", &[Some(3.2), None, Some(28.1)]);

        assert_eq!(obs.get(Variable::PrecipitationSum), Some(3.2));
        assert_eq!(obs.get(Variable::TemperatureMax), Some(28.1));
        assert_eq!(obs.get(Variable::RainSum), None);
    }

    #[test]
    fn test_from_row_tolerates_short_rows() {
        let index = VariableIndex::from_header(&["rain_sum", "snowfall_sum"]);
        let obs = DailyObservation::from_row(&index, "2021-07-04", &[Some(1.0)]);
        assert_eq!(obs.get(Variable::RainSum), Some(1.0));
        assert_eq!(obs.get(Variable::SnowfallSum), None);
    }

    #[test]
    fn test_malformed_date_has_no_month() {
        let obs = DailyObservation::new("2020-13-45");
        assert_eq!(obs.parsed_date(), None);
        assert_eq!(obs.year_month(), None);

        let ok = DailyObservation::new("2020-02-29");
        assert_eq!(ok.year_month(), Some(YearMonth::new(2020, 2)));
    }
}
