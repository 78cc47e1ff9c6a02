use crate::frame::FrameError;
use crate::store::error::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimoError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration JSON")]
    Json(#[from] serde_json::Error),

    #[error("Unknown variable name '{0}'")]
    UnknownVariable(String),

    #[error("Threshold '{name}' must be a finite, non-negative number (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("At least one valid-day signal variable is required")]
    NoValidDaySignals,

    #[error(
        "Window length and step must be positive (got length {window_years}, step {step_years})"
    )]
    InvalidWindow { window_years: i32, step_years: i32 },
}
