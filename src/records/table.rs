use crate::types::monthly_aggregate::RecordKind;
use crate::types::period::{month_from_name, month_name};
use crate::types::record_pair::RecordPair;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The all-time records of one month of year.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthRecords {
    pub high_tmax: RecordPair,
    pub low_tmin: RecordPair,
    pub max_24h_precip: RecordPair,
    pub max_24h_snow: RecordPair,
}

impl MonthRecords {
    /// The record kinds tracked across runs, in column order.
    pub const KINDS: [RecordKind; 4] = [
        RecordKind::HighTmax,
        RecordKind::LowTmin,
        RecordKind::MaxPrecipitation,
        RecordKind::MaxSnowfall,
    ];

    pub fn get(&self, kind: RecordKind) -> Option<&RecordPair> {
        match kind {
            RecordKind::HighTmax => Some(&self.high_tmax),
            RecordKind::LowTmin => Some(&self.low_tmin),
            RecordKind::MaxPrecipitation => Some(&self.max_24h_precip),
            RecordKind::MaxSnowfall => Some(&self.max_24h_snow),
            RecordKind::MaxRain => None,
        }
    }

    pub fn get_mut(&mut self, kind: RecordKind) -> Option<&mut RecordPair> {
        match kind {
            RecordKind::HighTmax => Some(&mut self.high_tmax),
            RecordKind::LowTmin => Some(&mut self.low_tmin),
            RecordKind::MaxPrecipitation => Some(&mut self.max_24h_precip),
            RecordKind::MaxSnowfall => Some(&mut self.max_24h_snow),
            RecordKind::MaxRain => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        Self::KINDS
            .iter()
            .filter_map(|kind| self.get(*kind))
            .all(RecordPair::is_empty)
    }
}

/// Record state for every month of year, keyed by month number (1-12).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordTable {
    months: BTreeMap<u32, MonthRecords>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from rows keyed by month name, as the store keeps them.
    /// Rows with an unrecognised month name are dropped.
    pub fn from_named<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, MonthRecords)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (name, records) in rows {
            match month_from_name(name.as_ref()) {
                Some(month) => table.insert(month, records),
                None => warn!("Dropping record row with unknown month '{}'", name.as_ref()),
            }
        }
        table
    }

    /// Rows keyed by English month name, in calendar order.
    pub fn to_named(&self) -> Vec<(&'static str, &MonthRecords)> {
        self.months
            .iter()
            .filter_map(|(month, records)| Some((month_name(*month)?, records)))
            .collect()
    }

    pub fn get(&self, month: u32) -> Option<&MonthRecords> {
        self.months.get(&month)
    }

    /// Inserts the records of a month, ignoring months outside 1-12.
    pub fn insert(&mut self, month: u32, records: MonthRecords) {
        if (1..=12).contains(&month) {
            self.months.insert(month, records);
        }
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &MonthRecords)> {
        self.months.iter().map(|(month, records)| (*month, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_roundtrip_and_unknown_names() {
        let mut march = MonthRecords::default();
        march.high_tmax = RecordPair::new(27.1, "30th Mar 2017");

        let table = RecordTable::from_named(vec![
            ("March", march.clone()),
            ("Marchember", MonthRecords::default()),
            ("jan", MonthRecords::default()),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(3), Some(&march));
        let names: Vec<_> = table.to_named().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["January", "March"]);
    }

    #[test]
    fn test_insert_ignores_bad_months() {
        let mut table = RecordTable::new();
        table.insert(0, MonthRecords::default());
        table.insert(13, MonthRecords::default());
        assert!(table.is_empty());
    }

    #[test]
    fn test_month_records_accessors() {
        let mut records = MonthRecords::default();
        assert!(records.is_empty());
        *records.get_mut(RecordKind::MaxSnowfall).unwrap() = RecordPair::new(30.0, "1985");
        assert!(!records.is_empty());
        assert!(records.get(RecordKind::MaxRain).is_none());
    }
}
