//! The ingestion round trip: read persisted state, aggregate, merge, write back.

use crate::aggregate::config::AggregationConfig;
use crate::aggregate::monthly::MonthlyAggregator;
use crate::climatology::builder::{build_fixed_windows, build_window};
use crate::climatology::windows::{trailing_window, WindowConfig};
use crate::error::{ClimoError, ConfigError};
use crate::records::merger::merge_with_buckets;
use crate::records::table::RecordTable;
use crate::records::tracker::RecordBuckets;
use crate::store::AggregateStore;
use crate::types::climo_row::ClimatologyWindow;
use crate::types::observation::DailyObservation;
use bon::Builder;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// What one [`ClimoEngine::ingest`] call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Monthly aggregates written (inserted or rebuilt).
    pub months_written: usize,
    /// Months that had no aggregate before this run.
    pub months_inserted: usize,
    /// All-time month records that this run set or improved.
    pub records_improved: usize,
    /// Observations dropped for an unparseable date.
    pub rows_skipped: usize,
}

/// Ties the aggregator, record tracking and window building to an [`AggregateStore`].
///
/// # Examples
///
/// ```
/// use climo::{AggregateStore, ClimoEngine, DailyObservation, MemoryStore, Variable};
///
/// let engine = ClimoEngine::builder().build();
/// let mut store = MemoryStore::new();
/// let observations = vec![
///     DailyObservation::new("2020-03-01").with(Variable::TemperatureMax, 30.0),
///     DailyObservation::new("2020-03-02").with(Variable::TemperatureMax, 32.0),
/// ];
///
/// let report = engine.ingest(&mut store, "10637", &observations)?;
/// assert_eq!(report.months_written, 1);
/// assert_eq!(store.load_aggregates("10637")?.len(), 1);
/// # Ok::<(), climo::ClimoError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct ClimoEngine {
    #[builder(default)]
    aggregation: AggregationConfig,
    #[builder(default)]
    windows: WindowConfig,
}

impl ClimoEngine {
    /// Builds an engine from validated configuration.
    pub fn new(aggregation: AggregationConfig, windows: WindowConfig) -> Result<Self, ConfigError> {
        aggregation.validate()?;
        windows.validate()?;
        Ok(Self {
            aggregation,
            windows,
        })
    }

    /// Parses an engine configuration such as
    /// `{"aggregation": {"thresholds": {"rain_mm": 1.0}}, "windows": {"step_years": 10}}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let engine: Self = serde_json::from_str(json)?;
        Self::new(engine.aggregation, engine.windows)
    }

    pub fn aggregation(&self) -> &AggregationConfig {
        &self.aggregation
    }

    pub fn windows(&self) -> &WindowConfig {
        &self.windows
    }

    /// Aggregates `observations`, merges their records into the persisted record
    /// state of `station`, and upserts the resulting monthly aggregates.
    ///
    /// Runs for the same station must not overlap: the record merge assumes the state
    /// it read is still current when it writes.
    pub fn ingest<S: AggregateStore>(
        &self,
        store: &mut S,
        station: &str,
        observations: &[DailyObservation],
    ) -> Result<IngestReport, ClimoError> {
        let rows_skipped = observations
            .iter()
            .filter(|obs| obs.parsed_date().is_none())
            .count();

        let aggregates =
            MonthlyAggregator::new(self.aggregation.clone()).aggregate_months(observations);
        let buckets = RecordBuckets::new().accumulate(observations);
        debug!(
            "Station {}: {} month(s), {} record candidate(s)",
            station,
            aggregates.len(),
            buckets.candidate_count()
        );

        let persisted = store.load_records(station)?;
        let merged = merge_with_buckets(&persisted, &buckets);
        if merged.changed > 0 {
            store.save_records(station, &merged.table)?;
        }
        let upserted = store.upsert_aggregates(station, aggregates)?;

        let report = IngestReport {
            months_written: upserted.inserted + upserted.replaced,
            months_inserted: upserted.inserted,
            records_improved: merged.changed,
            rows_skipped,
        };
        info!(
            "Ingested {} observation(s) for station {}: {} month(s) written, \
             {} record(s) improved, {} row(s) skipped",
            observations.len(),
            station,
            report.months_written,
            report.records_improved,
            report.rows_skipped
        );
        Ok(report)
    }

    /// Rebuilds every fixed climatological window of `station` and replaces the stored
    /// windows with them.
    pub fn normals<S: AggregateStore>(
        &self,
        store: &mut S,
        station: &str,
    ) -> Result<Vec<ClimatologyWindow>, ClimoError> {
        let history = store.load_aggregates(station)?;
        let windows = build_fixed_windows(&history, &self.windows, None);
        info!(
            "Built {} window(s) for station {} from {} monthly aggregate(s)",
            windows.len(),
            station,
            history.len()
        );
        store.replace_windows(station, windows.clone())?;
        Ok(windows)
    }

    /// Builds one arbitrary window. Nothing is persisted.
    pub fn window<S: AggregateStore>(
        &self,
        store: &S,
        station: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<ClimatologyWindow, ClimoError> {
        let history = store.load_aggregates(station)?;
        Ok(build_window(&history, start_year, end_year, None))
    }

    /// The window of configured length ending at the last year with data, or `None`
    /// when the station has no aggregates.
    pub fn trailing<S: AggregateStore>(
        &self,
        store: &S,
        station: &str,
    ) -> Result<Option<ClimatologyWindow>, ClimoError> {
        let history = store.load_aggregates(station)?;
        let Some(max_year) = history.iter().map(|a| a.year).max() else {
            return Ok(None);
        };
        Ok(trailing_window(max_year, self.windows.window_years)
            .map(|(start, end)| build_window(&history, start, end, None)))
    }

    /// The all-time record state of `station`.
    pub fn records<S: AggregateStore>(
        &self,
        store: &S,
        station: &str,
    ) -> Result<RecordTable, ClimoError> {
        Ok(store.load_records(station)?)
    }
}
