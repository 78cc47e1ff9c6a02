//! Builds climatology rows from monthly aggregate history.
//!
//! Every window is recomputed from scratch on each call. Month rows are reduced from
//! the per-year aggregates of that month; the annual row is rolled up from the twelve
//! month rows and never from daily data.

use crate::climatology::windows::WindowConfig;
use crate::numeric::{max, mean, min, round2_opt, sum};
use crate::records::merger::merge_record;
use crate::records::table::MonthRecords;
use crate::records::tracker::RecordBuckets;
use crate::types::climo_row::{
    AnnualRollup, ClimatologyWindow, ClimoMonthRow, ClimoStat, StatSource,
};
use crate::types::monthly_aggregate::{Metric, MonthlyAggregate};
use crate::types::period::{month_name, YearMonth};
use crate::types::record_pair::RecordPair;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Label of the annual summary row.
pub const ANNUAL_LABEL: &str = "Annual";

/// Builds the climatology of `start_year..=end_year`.
///
/// When `buckets` are given, their daily candidates within the window are merged into
/// the month records, which repairs records whose persisted date is only a year.
/// A range with no aggregates yields an empty window.
pub fn build_window(
    history: &[MonthlyAggregate],
    start_year: i32,
    end_year: i32,
    buckets: Option<&RecordBuckets>,
) -> ClimatologyWindow {
    if start_year > end_year {
        debug!("Empty window request {}-{}", start_year, end_year);
        return ClimatologyWindow::empty(start_year, end_year);
    }

    // One aggregate per (year, month); later entries of the history win.
    let in_range: BTreeMap<YearMonth, &MonthlyAggregate> = history
        .iter()
        .filter(|a| (start_year..=end_year).contains(&a.year) && (1..=12).contains(&a.month))
        .map(|a| (a.key(), a))
        .collect();
    if in_range.is_empty() {
        debug!("No aggregates within {}-{}", start_year, end_year);
        return ClimatologyWindow::empty(start_year, end_year);
    }

    let daily_records = buckets.map(|b| b.reduce_within(start_year, end_year));

    let rows: Vec<ClimoMonthRow> = (1..=12u32)
        .map(|month| {
            let label = month_name(month).unwrap_or_default();
            let aggregates: Vec<&MonthlyAggregate> = in_range
                .values()
                .filter(|a| a.month == month)
                .copied()
                .collect();
            let mut row = month_row(label, &aggregates);
            if let Some(daily) = daily_records.as_ref().and_then(|t| t.get(month)) {
                merge_daily_records(&mut row, daily);
            }
            row
        })
        .collect();

    let years: BTreeSet<i32> = in_range.keys().map(|k| k.year).collect();
    let annual_row = annual_row(&rows, years.len() as u32);
    debug!(
        "Built window {}-{} from {} aggregate(s)",
        start_year,
        end_year,
        in_range.len()
    );

    ClimatologyWindow {
        start_year,
        end_year,
        rows,
        annual_row: Some(annual_row),
    }
}

/// Builds every fixed window the history covers, in chronological order.
pub fn build_fixed_windows(
    history: &[MonthlyAggregate],
    config: &WindowConfig,
    buckets: Option<&RecordBuckets>,
) -> Vec<ClimatologyWindow> {
    let (Some(min_year), Some(max_year)) = (
        history.iter().map(|a| a.year).min(),
        history.iter().map(|a| a.year).max(),
    ) else {
        return Vec::new();
    };
    config
        .windows_for(min_year, max_year)
        .into_iter()
        .map(|(start, end)| build_window(history, start, end, buckets))
        .collect()
}

fn stat_value(aggregate: &MonthlyAggregate, stat: ClimoStat) -> Option<f64> {
    match stat.source() {
        StatSource::Metric(metric) => aggregate.value(metric),
        StatSource::Count(kind) => Some(f64::from(aggregate.count(kind))),
    }
}

fn month_row(label: &str, aggregates: &[&MonthlyAggregate]) -> ClimoMonthRow {
    let mut row = ClimoMonthRow::blank(label);
    if aggregates.is_empty() {
        return row;
    }

    for stat in ClimoStat::ALL {
        row.stats[stat as usize] = round2_opt(mean(aggregates.iter().map(|a| stat_value(a, stat))));
    }
    row.year_count = aggregates
        .iter()
        .map(|a| a.year)
        .collect::<BTreeSet<_>>()
        .len() as u32;

    let monthly_means = || aggregates.iter().map(|a| a.value(Metric::TemperatureMean));
    row.warmest_mean = round2_opt(max(monthly_means()));
    row.coldest_mean = round2_opt(min(monthly_means()));

    if let Some((total, year)) =
        wettest(aggregates.iter().map(|a| (a.value(Metric::Precipitation), a.year)))
    {
        row.wettest_total = round2_opt(Some(total));
        row.wettest_year = Some(year);
    }

    for kind in MonthRecords::KINDS {
        let mut best = RecordPair::empty();
        for aggregate in aggregates {
            best = RecordPair::more_extreme(&best, aggregate.record(kind), kind.extreme()).clone();
        }
        if let Some(slot) = row.record_mut(kind) {
            *slot = best;
        }
    }
    row
}

fn merge_daily_records(row: &mut ClimoMonthRow, daily: &MonthRecords) {
    for kind in MonthRecords::KINDS {
        if let (Some(slot), Some(incoming)) = (row.record_mut(kind), daily.get(kind)) {
            *slot = merge_record(slot, incoming, kind.extreme());
        }
    }
}

/// Largest total and its year; on equal totals the earliest year wins.
fn wettest<I>(candidates: I) -> Option<(f64, i32)>
where
    I: IntoIterator<Item = (Option<f64>, i32)>,
{
    candidates
        .into_iter()
        .filter_map(|(total, year)| Some((total.filter(|t| t.is_finite())?, year)))
        .fold(None, |best, (total, year)| match best {
            Some((best_total, best_year))
                if best_total > total || (best_total == total && best_year <= year) =>
            {
                Some((best_total, best_year))
            }
            _ => Some((total, year)),
        })
}

fn annual_row(rows: &[ClimoMonthRow], year_count: u32) -> ClimoMonthRow {
    let mut annual = ClimoMonthRow::blank(ANNUAL_LABEL);
    for stat in ClimoStat::ALL {
        let values = rows.iter().map(|r| r.stat(stat));
        annual.stats[stat as usize] = round2_opt(match stat.annual_rollup() {
            AnnualRollup::Sum => sum(values),
            AnnualRollup::Mean => mean(values),
        });
    }
    annual.year_count = year_count;
    annual.warmest_mean = max(rows.iter().map(|r| r.warmest_mean));
    annual.coldest_mean = min(rows.iter().map(|r| r.coldest_mean));

    if let Some((total, year)) = wettest(
        rows.iter()
            .filter_map(|r| Some((r.wettest_total, r.wettest_year?))),
    ) {
        annual.wettest_total = Some(total);
        annual.wettest_year = Some(year);
    }

    for kind in MonthRecords::KINDS {
        let mut best = RecordPair::empty();
        for candidate in rows.iter().filter_map(|r| r.record(kind)) {
            best = RecordPair::more_extreme(&best, candidate, kind.extreme()).clone();
        }
        if let Some(slot) = annual.record_mut(kind) {
            *slot = best;
        }
    }
    annual
}
