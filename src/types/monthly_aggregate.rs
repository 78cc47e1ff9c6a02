use crate::records::merger::merge_record;
use crate::types::period::YearMonth;
use crate::types::record_pair::{Extreme, RecordPair};
use crate::types::variable::Variable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A monthly statistic. Means are averaged over the days of the month, totals are
/// summed over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    TemperatureMax,
    TemperatureMin,
    TemperatureMean,
    DewPoint,
    /// Relative humidity as a fraction in `[0, 1]`.
    Humidity,
    Pressure,
    /// Cloud cover as a fraction in `[0, 1]`.
    CloudCover,
    WindSpeed,
    Precipitation,
    Rain,
    Snowfall,
    /// Sunshine hours.
    Sunshine,
    /// Daylight hours.
    Daylight,
}

impl Metric {
    pub const MEANS: [Metric; 8] = [
        Metric::TemperatureMax,
        Metric::TemperatureMin,
        Metric::TemperatureMean,
        Metric::DewPoint,
        Metric::Humidity,
        Metric::Pressure,
        Metric::CloudCover,
        Metric::WindSpeed,
    ];

    pub const TOTALS: [Metric; 5] = [
        Metric::Precipitation,
        Metric::Rain,
        Metric::Snowfall,
        Metric::Sunshine,
        Metric::Daylight,
    ];

    pub fn is_total(self) -> bool {
        Self::TOTALS.contains(&self)
    }

    /// The daily variable this metric reduces.
    pub fn source(self) -> Variable {
        match self {
            Metric::TemperatureMax => Variable::TemperatureMax,
            Metric::TemperatureMin => Variable::TemperatureMin,
            Metric::TemperatureMean => Variable::TemperatureMean,
            Metric::DewPoint => Variable::DewPointMean,
            Metric::Humidity => Variable::HumidityMean,
            Metric::Pressure => Variable::PressureMean,
            Metric::CloudCover => Variable::CloudCoverMean,
            Metric::WindSpeed => Variable::WindSpeedMax,
            Metric::Precipitation => Variable::PrecipitationSum,
            Metric::Rain => Variable::RainSum,
            Metric::Snowfall => Variable::SnowfallSum,
            Metric::Sunshine => Variable::SunshineDuration,
            Metric::Daylight => Variable::DaylightDuration,
        }
    }
}

/// Kinds of threshold day counts kept per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CountKind {
    /// Precipitation at or above the wet-day threshold.
    WetDays,
    /// Rain at or above the rainy-day threshold.
    RainyDays,
    /// Snowfall at or above the snowy-day threshold.
    SnowyDays,
    /// Minimum temperature below the frost threshold.
    FrostDays,
}

impl CountKind {
    pub const ALL: [CountKind; 4] = [
        CountKind::WetDays,
        CountKind::RainyDays,
        CountKind::SnowyDays,
        CountKind::FrostDays,
    ];
}

/// The record pairs carried by a monthly aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    HighTmax,
    LowTmin,
    MaxPrecipitation,
    MaxSnowfall,
    MaxRain,
}

impl RecordKind {
    pub const ALL: [RecordKind; 5] = [
        RecordKind::HighTmax,
        RecordKind::LowTmin,
        RecordKind::MaxPrecipitation,
        RecordKind::MaxSnowfall,
        RecordKind::MaxRain,
    ];

    pub fn extreme(self) -> Extreme {
        match self {
            RecordKind::LowTmin => Extreme::Lowest,
            _ => Extreme::Highest,
        }
    }

    pub fn variable(self) -> Variable {
        match self {
            RecordKind::HighTmax => Variable::TemperatureMax,
            RecordKind::LowTmin => Variable::TemperatureMin,
            RecordKind::MaxPrecipitation => Variable::PrecipitationSum,
            RecordKind::MaxSnowfall => Variable::SnowfallSum,
            RecordKind::MaxRain => Variable::RainSum,
        }
    }

    /// Wet records only consider strictly positive amounts.
    pub fn requires_positive(self) -> bool {
        matches!(
            self,
            RecordKind::MaxPrecipitation | RecordKind::MaxSnowfall | RecordKind::MaxRain
        )
    }
}

/// The reduction of one month of daily observations.
///
/// Aggregates are derived data: a rebuild overwrites every field except the record
/// pairs, which are merged with the previously persisted ones (see
/// [`MonthlyAggregate::merge_records_from`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    pub means: BTreeMap<Metric, Option<f64>>,
    pub totals: BTreeMap<Metric, Option<f64>>,
    pub day_counts: BTreeMap<CountKind, u32>,
    pub record_high_tmax: RecordPair,
    pub record_low_tmin: RecordPair,
    pub record_max_24h_precip: RecordPair,
    pub record_max_24h_snow: RecordPair,
    pub record_max_24h_rain: RecordPair,
    pub valid_days: Option<u32>,
}

impl MonthlyAggregate {
    /// An aggregate with every statistic missing.
    pub fn empty(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            means: Metric::MEANS.iter().map(|m| (*m, None)).collect(),
            totals: Metric::TOTALS.iter().map(|m| (*m, None)).collect(),
            day_counts: CountKind::ALL.iter().map(|c| (*c, 0)).collect(),
            record_high_tmax: RecordPair::empty(),
            record_low_tmin: RecordPair::empty(),
            record_max_24h_precip: RecordPair::empty(),
            record_max_24h_snow: RecordPair::empty(),
            record_max_24h_rain: RecordPair::empty(),
            valid_days: None,
        }
    }

    pub fn key(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }

    /// Looks up a metric in `means` or `totals`, whichever holds it.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let table = if metric.is_total() {
            &self.totals
        } else {
            &self.means
        };
        table.get(&metric).copied().flatten()
    }

    pub fn count(&self, kind: CountKind) -> u32 {
        self.day_counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn record(&self, kind: RecordKind) -> &RecordPair {
        match kind {
            RecordKind::HighTmax => &self.record_high_tmax,
            RecordKind::LowTmin => &self.record_low_tmin,
            RecordKind::MaxPrecipitation => &self.record_max_24h_precip,
            RecordKind::MaxSnowfall => &self.record_max_24h_snow,
            RecordKind::MaxRain => &self.record_max_24h_rain,
        }
    }

    pub fn record_mut(&mut self, kind: RecordKind) -> &mut RecordPair {
        match kind {
            RecordKind::HighTmax => &mut self.record_high_tmax,
            RecordKind::LowTmin => &mut self.record_low_tmin,
            RecordKind::MaxPrecipitation => &mut self.record_max_24h_precip,
            RecordKind::MaxSnowfall => &mut self.record_max_24h_snow,
            RecordKind::MaxRain => &mut self.record_max_24h_rain,
        }
    }

    /// Merges the record pairs of a previously persisted aggregate for the same month
    /// into `self`. Returns how many records `previous` had to give up to the fresh run.
    pub fn merge_records_from(&mut self, previous: &Self) -> usize {
        let mut improved = 0;
        for kind in RecordKind::ALL {
            let merged = merge_record(previous.record(kind), self.record(kind), kind.extreme());
            if &merged != previous.record(kind) {
                improved += 1;
            }
            *self.record_mut(kind) = merged;
        }
        improved
    }

    /// Share of the month's calendar days that carried usable data.
    pub fn completeness(&self) -> Option<f64> {
        let days = self.key().days()?;
        self.valid_days.map(|valid| f64::from(valid) / f64::from(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregate_has_every_key() {
        let agg = MonthlyAggregate::empty(2020, 2);
        assert_eq!(agg.means.len(), Metric::MEANS.len());
        assert_eq!(agg.totals.len(), Metric::TOTALS.len());
        assert_eq!(agg.count(CountKind::FrostDays), 0);
        assert_eq!(agg.value(Metric::Precipitation), None);
        assert_eq!(agg.completeness(), None);
    }

    #[test]
    fn test_metric_partition() {
        for m in Metric::MEANS {
            assert!(!m.is_total());
        }
        for m in Metric::TOTALS {
            assert!(m.is_total());
        }
    }

    #[test]
    fn test_merge_records_from_keeps_better_history() {
        let mut previous = MonthlyAggregate::empty(2020, 7);
        previous.record_high_tmax = RecordPair::new(38.0, "12th Jul 2020");
        previous.record_low_tmin = RecordPair::new(9.0, "2020");

        let mut fresh = MonthlyAggregate::empty(2020, 7);
        fresh.record_high_tmax = RecordPair::new(36.5, "20th Jul 2020");
        fresh.record_low_tmin = RecordPair::new(9.0, "3rd Jul 2020");
        fresh.record_max_24h_rain = RecordPair::new(12.0, "5th Jul 2020");

        let improved = fresh.merge_records_from(&previous);

        assert_eq!(fresh.record_high_tmax.date(), Some("12th Jul 2020"));
        assert_eq!(fresh.record_low_tmin.date(), Some("3rd Jul 2020"));
        assert_eq!(fresh.record_max_24h_rain.value(), Some(12.0));
        assert_eq!(improved, 2);
    }

    #[test]
    fn test_completeness_uses_calendar_days() {
        let mut agg = MonthlyAggregate::empty(2021, 2);
        agg.valid_days = Some(14);
        assert_eq!(agg.completeness(), Some(0.5));
    }
}
