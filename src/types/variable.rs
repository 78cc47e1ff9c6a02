//! Defines the daily weather variables understood by the aggregation engine and the
//! header-to-slot index used to decode rows from an observation source.

use crate::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A daily weather variable as delivered by the observation source.
///
/// The discriminant doubles as the slot index inside a [`crate::DailyObservation`],
/// so the order of the variants is the storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Variable {
    /// Daily maximum air temperature at 2 m (°C).
    TemperatureMax = 0,
    /// Daily minimum air temperature at 2 m (°C).
    TemperatureMin = 1,
    /// Daily mean air temperature at 2 m (°C).
    TemperatureMean = 2,
    /// Daily mean dew point at 2 m (°C).
    DewPointMean = 3,
    /// Daily mean relative humidity (fraction or percentage).
    HumidityMean = 4,
    /// Daily maximum relative humidity; decoded for callers, not aggregated.
    HumidityMax = 5,
    /// Daily minimum relative humidity; decoded for callers, not aggregated.
    HumidityMin = 6,
    /// Liquid rain sum (mm).
    RainSum = 7,
    /// Snowfall sum (cm).
    SnowfallSum = 8,
    /// Total precipitation sum (mm).
    PrecipitationSum = 9,
    /// Sunshine duration (seconds).
    SunshineDuration = 10,
    /// Daylight duration (seconds).
    DaylightDuration = 11,
    /// Mean sea level pressure (hPa).
    PressureMean = 12,
    /// Mean cloud cover (fraction or percentage).
    CloudCoverMean = 13,
    /// Maximum 10 m wind speed (km/h).
    WindSpeedMax = 14,
}

impl Variable {
    pub const COUNT: usize = 15;

    pub const ALL: [Variable; Variable::COUNT] = [
        Variable::TemperatureMax,
        Variable::TemperatureMin,
        Variable::TemperatureMean,
        Variable::DewPointMean,
        Variable::HumidityMean,
        Variable::HumidityMax,
        Variable::HumidityMin,
        Variable::RainSum,
        Variable::SnowfallSum,
        Variable::PrecipitationSum,
        Variable::SunshineDuration,
        Variable::DaylightDuration,
        Variable::PressureMean,
        Variable::CloudCoverMean,
        Variable::WindSpeedMax,
    ];

    /// Slot of this variable inside a dense observation row.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// The column name used by the observation source.
    pub fn api_name(self) -> &'static str {
        match self {
            Variable::TemperatureMax => "temperature_2m_max",
            Variable::TemperatureMin => "temperature_2m_min",
            Variable::TemperatureMean => "temperature_2m_mean",
            Variable::DewPointMean => "dew_point_2m_mean",
            Variable::HumidityMean => "relative_humidity_2m_mean",
            Variable::HumidityMax => "relative_humidity_2m_max",
            Variable::HumidityMin => "relative_humidity_2m_min",
            Variable::RainSum => "rain_sum",
            Variable::SnowfallSum => "snowfall_sum",
            Variable::PrecipitationSum => "precipitation_sum",
            Variable::SunshineDuration => "sunshine_duration",
            Variable::DaylightDuration => "daylight_duration",
            Variable::PressureMean => "pressure_msl_mean",
            Variable::CloudCoverMean => "cloud_cover_mean",
            Variable::WindSpeedMax => "wind_speed_10m_max",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl From<Variable> for &'static str {
    fn from(variable: Variable) -> Self {
        variable.api_name()
    }
}

impl TryFrom<String> for Variable {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Variable {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Variable::ALL
            .into_iter()
            .find(|v| v.api_name() == name)
            .ok_or_else(|| ConfigError::UnknownVariable(name.to_string()))
    }
}

/// Maps each known [`Variable`] to its column position in a source header.
///
/// Build it once per source schema and pass it by reference to row decoding,
/// so a reordered or extended header can never shift values into the wrong slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableIndex {
    columns: HashMap<Variable, usize>,
    width: usize,
}

impl VariableIndex {
    /// Builds the index from header names in source order. Names that are not a
    /// known variable (e.g. `time`) are skipped.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Self {
        let mut columns = HashMap::with_capacity(Variable::COUNT);
        for (position, name) in header.iter().enumerate() {
            match name.as_ref().parse::<Variable>() {
                Ok(variable) => {
                    columns.entry(variable).or_insert(position);
                }
                Err(_) => debug!("Ignoring unknown column '{}'", name.as_ref()),
            }
        }
        Self {
            columns,
            width: header.len(),
        }
    }

    /// Index covering every variable in canonical order.
    pub fn canonical() -> Self {
        Self::from_header(&Variable::ALL.map(Variable::api_name))
    }

    pub fn column_of(&self, variable: Variable) -> Option<usize> {
        self.columns.get(&variable).copied()
    }

    pub fn contains(&self, variable: Variable) -> bool {
        self.columns.contains_key(&variable)
    }

    /// Number of columns in the header the index was built from.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        Variable::ALL.into_iter().filter(|v| self.contains(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_slots_follow_declaration_order() {
        for (i, v) in Variable::ALL.iter().enumerate() {
            assert_eq!(v.slot(), i, "slot mismatch for {}", v);
        }
    }

    #[test]
    fn test_variable_parse_roundtrips_api_name() {
        for v in Variable::ALL {
            assert_eq!(v.api_name().parse::<Variable>().unwrap(), v);
        }
        assert!("temperature".parse::<Variable>().is_err());
    }

    #[test]
    fn test_index_from_reordered_header() {
        let header = ["time", "precipitation_sum", "bogus", "temperature_2m_max"];
        let index = VariableIndex::from_header(&header);

        assert_eq!(index.column_of(Variable::PrecipitationSum), Some(1));
        assert_eq!(index.column_of(Variable::TemperatureMax), Some(3));
        assert_eq!(index.column_of(Variable::TemperatureMin), None);
        assert_eq!(index.width(), 4);
        assert_eq!(
            index.variables().collect::<Vec<_>>(),
            vec![Variable::TemperatureMax, Variable::PrecipitationSum]
        );
    }

    #[test]
    fn test_variable_serde_uses_api_name() {
        let json = serde_json::to_string(&Variable::TemperatureMax).unwrap();
        assert_eq!(json, "\"temperature_2m_max\"");
        let back: Variable = serde_json::from_str("\"precipitation_sum\"").unwrap();
        assert_eq!(back, Variable::PrecipitationSum);
        assert!(serde_json::from_str::<Variable>("\"rainfall\"").is_err());
    }

    #[test]
    fn test_index_keeps_first_duplicate_column() {
        let header = ["rain_sum", "rain_sum"];
        let index = VariableIndex::from_header(&header);
        assert_eq!(index.column_of(Variable::RainSum), Some(0));
    }
}
