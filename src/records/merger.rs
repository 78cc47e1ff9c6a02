//! Merges persisted record state with freshly computed candidates.
//!
//! A merge never regresses a record: the persisted value is only replaced by a strictly
//! more extreme one. On equal values the persisted pair is kept, except that a bare-year
//! date is upgraded to an incoming full date.

use crate::records::table::{MonthRecords, RecordTable};
use crate::records::tracker::RecordBuckets;
use crate::types::record_pair::{Extreme, RecordPair};
use log::debug;

/// Merges one record pair. Idempotent: merging a pair with itself, or with a worse
/// candidate, returns the existing pair unchanged.
pub fn merge_record(existing: &RecordPair, incoming: &RecordPair, extreme: Extreme) -> RecordPair {
    let (Some(current), Some(candidate)) = (existing.value(), incoming.value()) else {
        return if incoming.is_empty() {
            existing.clone()
        } else {
            incoming.clone()
        };
    };

    if extreme.beats(candidate, current) {
        return incoming.clone();
    }
    if candidate == current && existing.has_imprecise_date() && incoming.has_precise_date() {
        return RecordPair::from_parts(Some(current), incoming.date().map(str::to_string));
    }
    existing.clone()
}

/// Merges the four records of one month.
pub fn merge_month_records(existing: &MonthRecords, incoming: &MonthRecords) -> MonthRecords {
    let mut merged = existing.clone();
    for kind in MonthRecords::KINDS {
        if let (Some(slot), Some(old), Some(new)) =
            (merged.get_mut(kind), existing.get(kind), incoming.get(kind))
        {
            *slot = merge_record(old, new, kind.extreme());
        }
    }
    merged
}

/// Result of merging a whole record table.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub table: RecordTable,
    /// How many individual records changed (new extreme, first value, or date upgrade).
    pub changed: usize,
}

/// Merges every month of `incoming` into `existing`. Months only present in
/// `existing` are carried over untouched.
pub fn merge_tables(existing: &RecordTable, incoming: &RecordTable) -> MergeOutcome {
    let mut table = existing.clone();
    let mut changed = 0;
    for (month, fresh) in incoming.iter() {
        let previous = existing.get(month).cloned().unwrap_or_default();
        let merged = merge_month_records(&previous, fresh);
        changed += MonthRecords::KINDS
            .iter()
            .filter(|kind| merged.get(**kind) != previous.get(**kind))
            .count();
        table.insert(month, merged);
    }
    debug!("Record merge changed {} record(s)", changed);
    MergeOutcome { table, changed }
}

/// Reduces the buckets of the current run and merges them into persisted state.
pub fn merge_with_buckets(existing: &RecordTable, buckets: &RecordBuckets) -> MergeOutcome {
    merge_tables(existing, &buckets.reduce())
}
