//! Tunable parameters of the monthly aggregation.

use crate::error::ConfigError;
use crate::types::variable::Variable;
use bon::Builder;
use serde::{Deserialize, Serialize};

/// Thresholds that classify a day as wet, rainy, snowy or frosty.
///
/// # Examples
///
/// ```
/// use climo::DayThresholds;
///
/// let thresholds = DayThresholds::builder().rain_mm(1.0).build();
/// assert_eq!(thresholds.rain_mm, 1.0);
/// assert_eq!(thresholds.precipitation_mm, 0.1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct DayThresholds {
    /// Rain at or above this amount (mm) makes a rainy day.
    #[builder(default = 2.5)]
    pub rain_mm: f64,
    /// Snowfall at or above this amount (cm) makes a snowy day.
    #[builder(default = 0.254)]
    pub snow_cm: f64,
    /// Precipitation at or above this amount (mm) makes a wet day.
    #[builder(default = 0.1)]
    pub precipitation_mm: f64,
    /// Minimum temperature strictly below this value (°C) makes a frost day.
    #[builder(default = 0.0)]
    pub frost_c: f64,
}

impl Default for DayThresholds {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Configuration of the monthly aggregator.
///
/// `valid_day_signals` lists, in priority order, the variables that mark a day as
/// carrying usable data. The first one with any value in the month is used; when
/// none has a value, every row counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct AggregationConfig {
    #[builder(default)]
    pub thresholds: DayThresholds,
    #[builder(default = vec![Variable::PrecipitationSum, Variable::TemperatureMax])]
    pub valid_day_signals: Vec<Variable>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AggregationConfig {
    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        for (name, value) in [
            ("rain_mm", t.rain_mm),
            ("snow_cm", t.snow_cm),
            ("precipitation_mm", t.precipitation_mm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if !t.frost_c.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                name: "frost_c",
                value: t.frost_c,
            });
        }
        if self.valid_day_signals.is_empty() {
            return Err(ConfigError::NoValidDaySignals);
        }
        Ok(())
    }
}
