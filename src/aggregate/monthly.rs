//! Reduces daily observations into [`MonthlyAggregate`]s.

use crate::aggregate::config::AggregationConfig;
use crate::numeric::{mean, round2_opt, sum};
use crate::percent::{is_out_of_range, normalize_fraction};
use crate::records::extreme::pick_extreme;
use crate::types::monthly_aggregate::{CountKind, Metric, MonthlyAggregate, RecordKind};
use crate::types::observation::DailyObservation;
use crate::types::period::YearMonth;
use crate::types::record_pair::RecordPair;
use crate::types::variable::Variable;
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::BTreeMap;

const SECONDS_PER_HOUR: f64 = 3600.0;

type Day<'a> = (NaiveDate, &'a DailyObservation);

/// Turns batches of daily observations into monthly aggregates.
///
/// Aggregation is a pure function of its input: the same observations in any order
/// produce the same aggregate, bit for bit.
#[derive(Debug, Clone, Default)]
pub struct MonthlyAggregator {
    config: AggregationConfig,
}

impl MonthlyAggregator {
    /// Creates an aggregator for an already validated configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use climo::{AggregationConfig, DailyObservation, MonthlyAggregator, Variable};
    ///
    /// let aggregator = MonthlyAggregator::new(AggregationConfig::default());
    /// let days = [DailyObservation::new("2020-03-01").with(Variable::PrecipitationSum, 4.0)];
    /// let march = aggregator.aggregate_month(2020, 3, &days);
    /// assert_eq!(march.valid_days, Some(1));
    /// ```
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Aggregates the observations of one calendar month. Rows outside the month, or
    /// with a malformed date, are ignored.
    pub fn aggregate_month(
        &self,
        year: i32,
        month: u32,
        observations: &[DailyObservation],
    ) -> MonthlyAggregate {
        let key = YearMonth::new(year, month);
        let days = observations
            .iter()
            .filter_map(|obs| obs.parsed_date().map(|date| (date, obs)))
            .filter(|(date, _)| date.year() == year && date.month() == month)
            .collect();
        self.reduce(key, days)
    }

    /// Buckets an arbitrary batch by `(year, month)` and aggregates every bucket.
    /// Output is sorted by year, then month.
    pub fn aggregate_months(&self, observations: &[DailyObservation]) -> Vec<MonthlyAggregate> {
        let mut buckets: BTreeMap<YearMonth, Vec<Day<'_>>> = BTreeMap::new();
        let mut skipped = 0usize;
        for obs in observations {
            match obs.parsed_date() {
                Some(date) => {
                    let key = YearMonth::new(date.year(), date.month());
                    buckets.entry(key).or_default().push((date, obs));
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!("Skipped {} observation(s) with an unparseable date", skipped);
        }
        buckets
            .into_iter()
            .map(|(key, days)| self.reduce(key, days))
            .collect()
    }

    fn reduce(&self, key: YearMonth, mut days: Vec<Day<'_>>) -> MonthlyAggregate {
        days.sort_by(|(da, a), (db, b)| da.cmp(db).then_with(|| compare_values(a, b)));

        let mut aggregate = MonthlyAggregate::empty(key.year, key.month);
        if days.is_empty() {
            return aggregate;
        }

        for metric in Metric::MEANS {
            let value = mean(days.iter().map(|(_, obs)| metric_value(obs, metric)));
            aggregate.means.insert(metric, round2_opt(value));
        }
        for metric in Metric::TOTALS {
            let value = sum(days.iter().map(|(_, obs)| metric_value(obs, metric)));
            aggregate.totals.insert(metric, round2_opt(value));
        }
        for kind in CountKind::ALL {
            let count = days.iter().filter(|(_, obs)| self.counts_as(obs, kind)).count();
            aggregate.day_counts.insert(kind, count as u32);
        }
        for kind in RecordKind::ALL {
            *aggregate.record_mut(kind) = month_record(&days, kind);
        }
        aggregate.valid_days = Some(self.valid_days(&days));
        aggregate
    }

    fn counts_as(&self, obs: &DailyObservation, kind: CountKind) -> bool {
        let t = &self.config.thresholds;
        match kind {
            CountKind::WetDays => obs
                .get(Variable::PrecipitationSum)
                .is_some_and(|v| v >= t.precipitation_mm),
            CountKind::RainyDays => obs.get(Variable::RainSum).is_some_and(|v| v >= t.rain_mm),
            CountKind::SnowyDays => obs
                .get(Variable::SnowfallSum)
                .is_some_and(|v| v >= t.snow_cm),
            CountKind::FrostDays => obs
                .get(Variable::TemperatureMin)
                .is_some_and(|v| v < t.frost_c),
        }
    }

    /// Counts days carrying the first signal variable that has any value this month,
    /// falling back to the raw row count.
    fn valid_days(&self, days: &[Day<'_>]) -> u32 {
        let signal = self
            .config
            .valid_day_signals
            .iter()
            .find(|signal| days.iter().any(|(_, obs)| obs.get(**signal).is_some()));
        match signal {
            Some(signal) => days
                .iter()
                .filter(|(_, obs)| obs.get(*signal).is_some())
                .count() as u32,
            None => days.len() as u32,
        }
    }
}

/// A daily value in the unit the monthly metric is kept in.
fn metric_value(obs: &DailyObservation, metric: Metric) -> Option<f64> {
    let raw = obs.get(metric.source());
    match metric {
        Metric::Humidity | Metric::CloudCover => {
            let fraction = normalize_fraction(raw);
            if let Some(value) = fraction.filter(|v| is_out_of_range(*v)) {
                debug!(
                    "{} on {} normalizes to {}, outside [0, 1]; keeping it",
                    metric.source(),
                    obs.iso_date(),
                    value
                );
            }
            fraction
        }
        Metric::Sunshine | Metric::Daylight => raw.map(|seconds| seconds / SECONDS_PER_HOUR),
        _ => raw,
    }
}

fn month_record(days: &[Day<'_>], kind: RecordKind) -> RecordPair {
    let candidates = days.iter().filter_map(|(date, obs)| {
        let value = obs.get(kind.variable())?;
        if kind.requires_positive() && value <= 0.0 {
            return None;
        }
        Some((value, *date))
    });
    pick_extreme(candidates, kind.extreme())
        .map(|(value, date)| RecordPair::observed(value, date))
        .unwrap_or_default()
}

/// Orders same-day duplicates by their values so input order never leaks into sums.
fn compare_values(a: &DailyObservation, b: &DailyObservation) -> std::cmp::Ordering {
    Variable::ALL
        .iter()
        .map(|v| match (a.get(*v), b.get(*v)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(std::cmp::Ordering::Equal)
}
