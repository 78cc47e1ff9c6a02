use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// English month names, indexed by `month - 1`. These are the keys the aggregate
/// store uses for monthly rows and record state.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Name of a month of year (1-12), or `None` when out of range.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Month of year (1-12) for an English month name, case-insensitive.
/// Three-letter abbreviations are accepted.
pub fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim();
    if name.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|full| {
            full.eq_ignore_ascii_case(name)
                || (name.len() == 3 && full[..3].eq_ignore_ascii_case(name))
        })
        .map(|i| i as u32 + 1)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_month_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_day_of_next_month = NaiveDate::from_ymd_opt(next_month_year, next_month, 1)?;
    let last_day_of_current_month = first_day_of_next_month - Duration::days(1);
    Some(last_day_of_current_month.day())
}

/// A calendar month of a specific year; the key of one monthly aggregate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn month_name(self) -> &'static str {
        month_name(self.month).unwrap_or("Unknown")
    }

    pub fn days(self) -> Option<u32> {
        days_in_month(self.year, self.month)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_month_from_name_accepts_abbreviations() {
        assert_eq!(month_from_name("march"), Some(3));
        assert_eq!(month_from_name("Sep"), Some(9));
        assert_eq!(month_from_name(" December "), Some(12));
        assert_eq!(month_from_name("Ju"), None);
        assert_eq!(month_from_name("Smarch"), None);
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2020, 2), Some(29));
        assert_eq!(days_in_month(2021, 2), Some(28));
        assert_eq!(days_in_month(2021, 12), Some(31));
        assert_eq!(days_in_month(2021, 13), None);
    }

    #[test]
    fn test_year_month_ordering_and_display() {
        let a = YearMonth::new(2019, 12);
        let b = YearMonth::new(2020, 1);
        assert!(a < b);
        assert_eq!(b.to_string(), "2020-01");
        assert_eq!(a.month_name(), "December");
    }
}
