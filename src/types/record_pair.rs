//! Record extremes and the dates they happened on.
//!
//! Persisted record dates are human-formatted (`"2nd Mar 2020"`). Older rows may only
//! carry a bare year (`"2001"`); such dates are treated as imprecise and can be
//! upgraded by the record merger when an equal value with a full date comes in.

use crate::types::observation::ISO_DATE_FORMAT;
use crate::types::period::month_from_name;
use chrono::{Datelike, NaiveDate};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which end of the distribution a record tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extreme {
    /// Heat and wet records: larger is more extreme.
    Highest,
    /// Cold records: smaller is more extreme.
    Lowest,
}

impl Extreme {
    /// `true` when `candidate` beats `current` strictly.
    pub fn beats(self, candidate: f64, current: f64) -> bool {
        match self {
            Extreme::Highest => candidate > current,
            Extreme::Lowest => candidate < current,
        }
    }

    /// Orders two values so that the more extreme one compares as `Less`.
    /// Signed zeros compare equal.
    pub(crate) fn rank(self, a: f64, b: f64) -> Ordering {
        let (a, b) = (OrderedFloat(a), OrderedFloat(b));
        match self {
            Extreme::Highest => b.cmp(&a),
            Extreme::Lowest => a.cmp(&b),
        }
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Formats a date the way record dates are persisted, e.g. `2nd Mar 2020`.
pub fn format_record_date(date: NaiveDate) -> String {
    format!(
        "{}{} {}",
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%b %Y")
    )
}

/// A parsed record date: either a full calendar day or a bare year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDate {
    Day(NaiveDate),
    Year(i32),
}

impl RecordDate {
    /// Parses `"2nd Mar 2020"`, `"2 March 2020"`, `"2020-03-02"` or a bare `"2020"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if is_bare_year(text) {
            return text.parse().ok().map(RecordDate::Year);
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, ISO_DATE_FORMAT) {
            return Some(RecordDate::Day(date));
        }

        let mut parts = text.split_whitespace();
        let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let day: u32 = day
            .trim_end_matches(|c: char| c.is_ascii_alphabetic())
            .parse()
            .ok()?;
        let month = month_from_name(month.trim_end_matches('.'))?;
        let year: i32 = year.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day).map(RecordDate::Day)
    }

    pub fn is_precise(self) -> bool {
        matches!(self, RecordDate::Day(_))
    }

    pub fn year(self) -> i32 {
        match self {
            RecordDate::Day(date) => date.year(),
            RecordDate::Year(year) => year,
        }
    }

    /// Chronological key; a bare year sorts as the first of January.
    pub fn sort_key(self) -> NaiveDate {
        match self {
            RecordDate::Day(date) => date,
            RecordDate::Year(year) => {
                NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
            }
        }
    }
}

fn is_bare_year(text: &str) -> bool {
    text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Deserialize)]
struct RawRecordPair {
    value: Option<f64>,
    date: Option<String>,
}

impl From<RawRecordPair> for RecordPair {
    fn from(raw: RawRecordPair) -> Self {
        RecordPair::from_parts(raw.value, raw.date)
    }
}

/// An extreme observation and when it happened.
///
/// `date` is `None` exactly when `value` is `None`; every constructor (and
/// deserialization) enforces this.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawRecordPair")]
pub struct RecordPair {
    value: Option<f64>,
    date: Option<String>,
}

impl RecordPair {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a pair from a value and an already formatted date.
    pub fn new(value: f64, date: impl Into<String>) -> Self {
        Self::from_parts(Some(value), Some(date.into()))
    }

    /// Builds a pair for a value observed on `date`, formatting the date for persistence.
    pub fn observed(value: f64, date: NaiveDate) -> Self {
        Self::new(value, format_record_date(date))
    }

    /// Builds a pair from optional parts, collapsing to empty unless both a finite
    /// value and a non-blank date are present.
    pub fn from_parts(value: Option<f64>, date: Option<String>) -> Self {
        match (value.filter(|v| v.is_finite()), date) {
            (Some(value), Some(date)) if !date.trim().is_empty() => Self {
                value: Some(value),
                date: Some(date.trim().to_string()),
            },
            _ => Self::empty(),
        }
    }

    /// The record value, `None` for an empty pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use climo::RecordPair;
    ///
    /// assert_eq!(RecordPair::new(41.2, "2nd Aug 2003").value(), Some(41.2));
    /// assert_eq!(RecordPair::empty().value(), None);
    /// ```
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// The persisted date text, trimmed.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// `true` when no record has been set yet.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn parsed_date(&self) -> Option<RecordDate> {
        self.date.as_deref().and_then(RecordDate::parse)
    }

    /// A bare four-digit year is the only date form considered imprecise.
    pub fn has_imprecise_date(&self) -> bool {
        self.date.as_deref().is_some_and(|d| is_bare_year(d.trim()))
    }

    /// A date that parses to a specific calendar day.
    pub fn has_precise_date(&self) -> bool {
        self.parsed_date().is_some_and(RecordDate::is_precise)
    }

    /// Picks the more extreme of two pairs; on equal values the earlier date wins.
    /// Dates that fail to parse sort after every parseable date.
    pub fn more_extreme<'a>(
        a: &'a RecordPair,
        b: &'a RecordPair,
        extreme: Extreme,
    ) -> &'a RecordPair {
        match (a.value, b.value) {
            (None, _) => b,
            (_, None) => a,
            (Some(va), Some(vb)) => match extreme.rank(va, vb) {
                Ordering::Less => a,
                Ordering::Greater => b,
                Ordering::Equal => {
                    let ka = a.parsed_date().map(RecordDate::sort_key);
                    let kb = b.parsed_date().map(RecordDate::sort_key);
                    match (ka, kb) {
                        (Some(ka), Some(kb)) if kb < ka => b,
                        (None, Some(_)) => b,
                        _ => a,
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_record_date_ordinals() {
        assert_eq!(format_record_date(date(2020, 3, 1)), "1st Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 2)), "2nd Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 3)), "3rd Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 4)), "4th Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 11)), "11th Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 12)), "12th Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 13)), "13th Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 21)), "21st Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 22)), "22nd Mar 2020");
        assert_eq!(format_record_date(date(2020, 3, 31)), "31st Mar 2020");
    }

    #[test]
    fn test_record_date_parse_forms() {
        assert_eq!(RecordDate::parse("2nd Mar 2020"), Some(RecordDate::Day(date(2020, 3, 2))));
        assert_eq!(RecordDate::parse("4 January 2001"), Some(RecordDate::Day(date(2001, 1, 4))));
        assert_eq!(RecordDate::parse("2020-03-02"), Some(RecordDate::Day(date(2020, 3, 2))));
        assert_eq!(RecordDate::parse(" 2001 "), Some(RecordDate::Year(2001)));
        assert_eq!(RecordDate::parse("31st Feb 2020"), None);
        assert_eq!(RecordDate::parse("sometime"), None);
        assert_eq!(RecordDate::parse("1st Mar 2020 extra"), None);
    }

    #[test]
    fn test_record_pair_invariant() {
        assert!(RecordPair::from_parts(Some(3.0), None).is_empty());
        assert!(RecordPair::from_parts(None, Some("2001".into())).date().is_none());
        assert!(RecordPair::from_parts(Some(f64::NAN), Some("2001".into())).is_empty());
        assert!(RecordPair::new(3.0, "   ").is_empty());

        let pair = RecordPair::observed(32.0, date(2020, 3, 2));
        assert_eq!(pair.value(), Some(32.0));
        assert_eq!(pair.date(), Some("2nd Mar 2020"));
    }

    #[test]
    fn test_deserialize_restores_invariant() {
        let pair: RecordPair = serde_json::from_str(r#"{"value": 12.5, "date": null}"#).unwrap();
        assert!(pair.is_empty());
        assert_eq!(pair.date(), None);

        let pair: RecordPair = serde_json::from_str(r#"{"value": 12.5, "date": "2001"}"#).unwrap();
        assert_eq!(pair.value(), Some(12.5));
        assert!(pair.has_imprecise_date());
        assert!(!pair.has_precise_date());
    }

    #[test]
    fn test_more_extreme_prefers_earliest_on_ties() {
        let later = RecordPair::new(50.0, "15th Jul 2020");
        let earlier = RecordPair::new(50.0, "1st Jul 2020");
        let picked = RecordPair::more_extreme(&later, &earlier, Extreme::Highest);
        assert_eq!(picked.date(), Some("1st Jul 2020"));

        let cold = RecordPair::new(-12.0, "3rd Jan 1987");
        let colder = RecordPair::new(-15.0, "9th Jan 1985");
        assert_eq!(RecordPair::more_extreme(&cold, &colder, Extreme::Lowest), &colder);
        assert_eq!(RecordPair::more_extreme(&cold, &colder, Extreme::Highest), &cold);
        assert_eq!(RecordPair::more_extreme(&RecordPair::empty(), &cold, Extreme::Lowest), &cold);
    }

    #[test]
    fn test_more_extreme_signed_zero_is_a_tie() {
        let zero = RecordPair::new(0.0, "1st Jan 1990");
        let negative_zero = RecordPair::new(-0.0, "1st Jan 1991");
        for extreme in [Extreme::Lowest, Extreme::Highest] {
            assert_eq!(extreme.rank(0.0, -0.0), Ordering::Equal);
            let picked = RecordPair::more_extreme(&negative_zero, &zero, extreme);
            assert_eq!(picked.date(), Some("1st Jan 1990"));
        }
    }
}
