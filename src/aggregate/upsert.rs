use crate::types::monthly_aggregate::{MonthlyAggregate, RecordKind};
use crate::types::period::YearMonth;
use std::collections::BTreeMap;

/// Outcome of writing fresh aggregates over persisted ones.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    /// Every aggregate after the upsert, sorted by year then month.
    pub aggregates: Vec<MonthlyAggregate>,
    /// Months that did not exist before.
    pub inserted: usize,
    /// Months that were rebuilt.
    pub replaced: usize,
    /// Record pairs that the fresh run improved over persisted state.
    pub records_changed: usize,
}

/// De-duplicates by `(year, month)`, last one wins.
pub fn dedupe_aggregates(aggregates: Vec<MonthlyAggregate>) -> Vec<MonthlyAggregate> {
    let mut by_key: BTreeMap<YearMonth, MonthlyAggregate> = BTreeMap::new();
    for aggregate in aggregates {
        by_key.insert(aggregate.key(), aggregate);
    }
    by_key.into_values().collect()
}

/// Writes `fresh` over `existing`, keyed by `(year, month)`.
///
/// Derived statistics of a rebuilt month are overwritten. Its record pairs are merged
/// with the persisted ones, so rebuilding from a partial re-fetch never loses a record.
pub fn upsert_aggregates(
    existing: Vec<MonthlyAggregate>,
    fresh: Vec<MonthlyAggregate>,
) -> UpsertOutcome {
    let mut by_key: BTreeMap<YearMonth, MonthlyAggregate> = dedupe_aggregates(existing)
        .into_iter()
        .map(|a| (a.key(), a))
        .collect();
    let mut inserted = 0;
    let mut replaced = 0;
    let mut records_changed = 0;

    for mut aggregate in dedupe_aggregates(fresh) {
        match by_key.get(&aggregate.key()) {
            Some(previous) => {
                records_changed += aggregate.merge_records_from(previous);
                replaced += 1;
            }
            None => {
                records_changed += RecordKind::ALL
                    .iter()
                    .filter(|kind| !aggregate.record(**kind).is_empty())
                    .count();
                inserted += 1;
            }
        }
        by_key.insert(aggregate.key(), aggregate);
    }

    UpsertOutcome {
        aggregates: by_key.into_values().collect(),
        inserted,
        replaced,
        records_changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::monthly_aggregate::Metric;
    use crate::types::record_pair::RecordPair;

    fn agg(year: i32, month: u32, tmax: f64) -> MonthlyAggregate {
        let mut a = MonthlyAggregate::empty(year, month);
        a.means.insert(Metric::TemperatureMax, Some(tmax));
        a
    }

    #[test]
    fn test_dedupe_keeps_last() {
        let rows = vec![agg(2020, 2, 1.0), agg(2020, 1, 5.0), agg(2020, 2, 9.0)];
        let deduped = dedupe_aggregates(rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].month, 1);
        assert_eq!(deduped[1].value(Metric::TemperatureMax), Some(9.0));
    }

    #[test]
    fn test_upsert_overwrites_stats_and_merges_records() {
        let mut old = agg(2020, 7, 30.0);
        old.record_high_tmax = RecordPair::new(38.2, "18th Jul 2020");
        let mut fresh = agg(2020, 7, 31.0);
        fresh.record_high_tmax = RecordPair::new(36.0, "2nd Jul 2020");
        let mut new_month = agg(2020, 8, 29.0);
        new_month.record_high_tmax = RecordPair::new(35.0, "8th Aug 2020");

        let outcome = upsert_aggregates(vec![old, agg(2020, 6, 25.0)], vec![fresh, new_month]);

        assert_eq!(outcome.aggregates.len(), 3);
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.records_changed, 1);
        let july = &outcome.aggregates[1];
        assert_eq!(july.value(Metric::TemperatureMax), Some(31.0));
        assert_eq!(july.record_high_tmax.value(), Some(38.2));
    }
}
