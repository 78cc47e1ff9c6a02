//! Partitioning of observed years into climatological windows.

use crate::error::ConfigError;
use bon::Builder;
use log::warn;
use serde::{Deserialize, Serialize};

/// Upper bound on the windows a single call produces.
pub const MAX_WINDOWS: usize = 1000;

/// Fixed climatological window layout: windows of `window_years` starting at
/// `base_start_year` and every `step_years` after it.
///
/// # Examples
///
/// ```
/// use climo::WindowConfig;
///
/// let config = WindowConfig::builder().step_years(10).build();
/// assert_eq!(config.base_start_year, 1961);
/// assert_eq!(config.windows_for(1950, 2020).len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct WindowConfig {
    #[builder(default = 1961)]
    pub base_start_year: i32,
    #[builder(default = 30)]
    pub window_years: i32,
    #[builder(default = 30)]
    pub step_years: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WindowConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_years <= 0 || self.step_years <= 0 {
            return Err(ConfigError::InvalidWindow {
                window_years: self.window_years,
                step_years: self.step_years,
            });
        }
        Ok(())
    }

    pub fn windows_for(&self, min_year: i32, max_year: i32) -> Vec<(i32, i32)> {
        fixed_windows(
            min_year,
            max_year,
            self.base_start_year,
            self.window_years,
            self.step_years,
        )
    }
}

/// Emits `(start, end)` year ranges, inclusive, starting at `base_start_year` and
/// stepping by `step_years`. Only complete windows ending no later than `max_year` are
/// emitted, and a window must reach into `[min_year, max_year]`.
///
/// Non-positive lengths or steps yield no windows. Output is capped at [`MAX_WINDOWS`].
pub fn fixed_windows(
    min_year: i32,
    max_year: i32,
    base_start_year: i32,
    window_years: i32,
    step_years: i32,
) -> Vec<(i32, i32)> {
    if window_years <= 0 || step_years <= 0 {
        warn!(
            "Ignoring window request with length {} and step {}",
            window_years, step_years
        );
        return Vec::new();
    }
    if min_year > max_year {
        return Vec::new();
    }

    // Jump straight to the first window that ends inside the data, so every
    // remaining iteration emits a window and MAX_WINDOWS bounds the loop.
    let (base, step) = (i64::from(base_start_year), i64::from(step_years));
    let gap = (i64::from(min_year) - (base + i64::from(window_years) - 1)).max(0);
    let skipped = (gap + step - 1) / step;
    let Ok(mut start) = i32::try_from(base + skipped * step) else {
        return Vec::new();
    };

    let mut windows = Vec::new();
    while let Some(end) = start.checked_add(window_years - 1) {
        if end > max_year {
            break;
        }
        if windows.len() == MAX_WINDOWS {
            warn!("Window generation capped at {} windows", MAX_WINDOWS);
            break;
        }
        windows.push((start, end));
        match start.checked_add(step_years) {
            Some(next) => start = next,
            None => break,
        }
    }
    windows
}

/// The most recent window of `window_years` ending at `max_year`.
pub fn trailing_window(max_year: i32, window_years: i32) -> Option<(i32, i32)> {
    if window_years <= 0 {
        return None;
    }
    Some((max_year.checked_sub(window_years - 1)?, max_year))
}
