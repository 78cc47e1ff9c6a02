//! Climatology aggregation and record tracking.
//!
//! Daily weather observations are reduced into monthly aggregates, month-of-year
//! record extremes are tracked and merged across ingestion runs, and multi-year
//! climatology windows (such as the 1991-2020 normals) are built from the monthly
//! history. All computation is pure and synchronous; persistence goes through the
//! [`AggregateStore`] trait.

mod aggregate;
mod climatology;
mod engine;
mod error;
mod frame;
mod records;
mod store;
mod types;

pub mod numeric;
pub mod percent;

pub use error::{ClimoError, ConfigError};

pub use aggregate::config::{AggregationConfig, DayThresholds};
pub use aggregate::monthly::MonthlyAggregator;
pub use aggregate::upsert::{dedupe_aggregates, upsert_aggregates, UpsertOutcome};

pub use records::merger::{
    merge_month_records, merge_record, merge_tables, merge_with_buckets, MergeOutcome,
};
pub use records::table::{MonthRecords, RecordTable};
pub use records::tracker::{accumulate, MonthlyDailyRecordBucket, RecordBuckets, RecordCandidate};

pub use climatology::builder::{build_fixed_windows, build_window, ANNUAL_LABEL};
pub use climatology::windows::{fixed_windows, trailing_window, WindowConfig, MAX_WINDOWS};

pub use store::error::StoreError;
pub use store::memory::{MemoryStore, StationState};
pub use store::AggregateStore;

pub use frame::{
    aggregates_to_frame, observations_from_csv, observations_from_frame, observations_from_lazy,
    window_to_frame, FrameError, DATE_COLUMNS,
};

pub use engine::{ClimoEngine, IngestReport};

pub use types::climo_row::*;
pub use types::monthly_aggregate::*;
pub use types::observation::DailyObservation;
pub use types::period::{month_from_name, month_name, YearMonth, MONTH_NAMES};
pub use types::record_pair::{format_record_date, Extreme, RecordDate, RecordPair};
pub use types::variable::{Variable, VariableIndex};
