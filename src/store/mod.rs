//! The persistence boundary.
//!
//! The engine only talks to storage through [`AggregateStore`]. Monthly aggregates are
//! upserted by `(year, month)`, record state is read before and written after every
//! ingestion, and climatology windows are replaced wholesale.
//!
//! Writes take `&mut self`. Serializing ingestion runs per station is up to the caller.

pub mod error;
pub mod memory;

use crate::aggregate::upsert::UpsertOutcome;
use crate::records::table::RecordTable;
use crate::store::error::StoreError;
use crate::types::climo_row::ClimatologyWindow;
use crate::types::monthly_aggregate::MonthlyAggregate;

pub trait AggregateStore {
    /// Every persisted aggregate of `station`, sorted by year then month.
    fn load_aggregates(&self, station: &str) -> Result<Vec<MonthlyAggregate>, StoreError>;

    /// Upserts `aggregates` keyed by `(year, month)`, merging record pairs with the
    /// persisted rows they replace.
    fn upsert_aggregates(
        &mut self,
        station: &str,
        aggregates: Vec<MonthlyAggregate>,
    ) -> Result<UpsertOutcome, StoreError>;

    /// All-time record state of `station`, keyed by month of year.
    fn load_records(&self, station: &str) -> Result<RecordTable, StoreError>;

    /// Overwrites the record state of `station`. Callers merge before saving, so the
    /// table passed in is the complete new state.
    ///
    /// # Examples
    ///
    /// ```
    /// use climo::{AggregateStore, MemoryStore, RecordTable};
    ///
    /// let mut store = MemoryStore::new();
    /// store.save_records("EHAM", &RecordTable::new())?;
    /// assert!(store.load_records("EHAM")?.is_empty());
    /// # Ok::<(), climo::StoreError>(())
    /// ```
    fn save_records(&mut self, station: &str, records: &RecordTable) -> Result<(), StoreError>;

    /// Replaces every stored window of `station`.
    fn replace_windows(
        &mut self,
        station: &str,
        windows: Vec<ClimatologyWindow>,
    ) -> Result<(), StoreError>;

    /// The windows last stored for `station`, in the order they were saved. Unknown
    /// stations yield an empty list.
    fn load_windows(&self, station: &str) -> Result<Vec<ClimatologyWindow>, StoreError>;
}
