//! Accumulates per-month record candidates across ingestion batches.
//!
//! Accumulation and reduction are separate steps: several batches (for example the
//! chunks of a multi-decade backfill) can feed one [`RecordBuckets`] before it is
//! reduced to a [`RecordTable`].

use crate::records::extreme::pick_extreme;
use crate::records::table::{MonthRecords, RecordTable};
use crate::types::monthly_aggregate::RecordKind;
use crate::types::observation::{DailyObservation, ISO_DATE_FORMAT};
use crate::types::record_pair::RecordPair;
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// A candidate extreme value and its ISO date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCandidate {
    pub value: f64,
    pub iso_date: String,
}

/// Record candidates of one month of year.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyDailyRecordBucket {
    pub tmax: Vec<RecordCandidate>,
    pub tmin: Vec<RecordCandidate>,
    pub precip: Vec<RecordCandidate>,
    pub snow: Vec<RecordCandidate>,
}

impl MonthlyDailyRecordBucket {
    pub fn candidates(&self, kind: RecordKind) -> &[RecordCandidate] {
        match kind {
            RecordKind::HighTmax => &self.tmax,
            RecordKind::LowTmin => &self.tmin,
            RecordKind::MaxPrecipitation => &self.precip,
            RecordKind::MaxSnowfall => &self.snow,
            RecordKind::MaxRain => &[],
        }
    }

    fn candidates_mut(&mut self, kind: RecordKind) -> Option<&mut Vec<RecordCandidate>> {
        match kind {
            RecordKind::HighTmax => Some(&mut self.tmax),
            RecordKind::LowTmin => Some(&mut self.tmin),
            RecordKind::MaxPrecipitation => Some(&mut self.precip),
            RecordKind::MaxSnowfall => Some(&mut self.snow),
            RecordKind::MaxRain => None,
        }
    }

    pub fn len(&self) -> usize {
        self.tmax.len() + self.tmin.len() + self.precip.len() + self.snow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reduces the bucket to one record per kind, optionally keeping only candidates
    /// whose year lies within `years` (inclusive).
    pub fn reduce(&self, years: Option<(i32, i32)>) -> MonthRecords {
        let mut records = MonthRecords::default();
        for kind in MonthRecords::KINDS {
            let candidates = self.candidates(kind).iter().filter_map(|c| {
                let date = NaiveDate::parse_from_str(&c.iso_date, ISO_DATE_FORMAT).ok()?;
                if let Some((start, end)) = years {
                    if date.year() < start || date.year() > end {
                        return None;
                    }
                }
                if kind.requires_positive() && c.value <= 0.0 {
                    return None;
                }
                Some((c.value, date))
            });
            if let Some(slot) = records.get_mut(kind) {
                *slot = pick_extreme(candidates, kind.extreme())
                    .map(|(value, date)| RecordPair::observed(value, date))
                    .unwrap_or_default();
            }
        }
        records
    }
}

/// One bucket per month of year.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordBuckets {
    months: [MonthlyDailyRecordBucket; 12],
}

impl RecordBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket of a month of year (1-12).
    pub fn month(&self, month: u32) -> Option<&MonthlyDailyRecordBucket> {
        self.months.get(month.checked_sub(1)? as usize)
    }

    /// Appends every finite tmax/tmin/precipitation/snowfall value of `observations`
    /// to its month bucket. Rows with a malformed date are skipped.
    pub fn accumulate(mut self, observations: &[DailyObservation]) -> Self {
        let mut skipped = 0usize;
        for obs in observations {
            let Some(date) = obs.parsed_date() else {
                skipped += 1;
                continue;
            };
            let bucket = &mut self.months[date.month0() as usize];
            for kind in MonthRecords::KINDS {
                let value = obs.get(kind.variable());
                let (Some(value), Some(list)) = (value, bucket.candidates_mut(kind)) else {
                    continue;
                };
                list.push(RecordCandidate {
                    value,
                    iso_date: date.format(ISO_DATE_FORMAT).to_string(),
                });
            }
        }
        if skipped > 0 {
            debug!("Record tracker skipped {} row(s) with an unparseable date", skipped);
        }
        self
    }

    pub fn candidate_count(&self) -> usize {
        self.months.iter().map(MonthlyDailyRecordBucket::len).sum()
    }

    /// Reduces every non-empty bucket to its records.
    pub fn reduce(&self) -> RecordTable {
        self.reduce_impl(None)
    }

    /// Like [`RecordBuckets::reduce`], but only candidates from `start..=end` count.
    pub fn reduce_within(&self, start: i32, end: i32) -> RecordTable {
        self.reduce_impl(Some((start, end)))
    }

    fn reduce_impl(&self, years: Option<(i32, i32)>) -> RecordTable {
        let mut table = RecordTable::new();
        for (i, bucket) in self.months.iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let records = bucket.reduce(years);
            if !records.is_empty() {
                table.insert(i as u32 + 1, records);
            }
        }
        table
    }
}

/// `accumulate(existing, observations) -> updated`, for callers that prefer a free function.
pub fn accumulate(existing: RecordBuckets, observations: &[DailyObservation]) -> RecordBuckets {
    existing.accumulate(observations)
}
