use crate::aggregate::upsert::{upsert_aggregates, UpsertOutcome};
use crate::records::table::RecordTable;
use crate::store::error::StoreError;
use crate::store::AggregateStore;
use crate::types::climo_row::ClimatologyWindow;
use crate::types::monthly_aggregate::MonthlyAggregate;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Everything stored for one station.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StationState {
    pub aggregates: Vec<MonthlyAggregate>,
    pub records: RecordTable,
    pub windows: Vec<ClimatologyWindow>,
}

/// An in-memory [`AggregateStore`] that can snapshot itself to disk.
///
/// Stations that were never written to read back as empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    stations: BTreeMap<String, StationState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn station(&self, station: &str) -> Option<&StationState> {
        self.stations.get(station)
    }

    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }

    pub fn remove_station(&mut self, station: &str) -> Result<StationState, StoreError> {
        self.stations
            .remove(station)
            .ok_or_else(|| StoreError::UnknownStation(station.to_string()))
    }

    fn state_mut(&mut self, station: &str) -> &mut StationState {
        self.stations.entry(station.to_string()).or_default()
    }

    /// Writes the whole store to `path`.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let data = bincode::serde::encode_to_vec(self, BINCODE_CONFIG)
            .map_err(|e| StoreError::SnapshotEncode(Box::new(e)))?;
        std::fs::write(path, &data)
            .map_err(|e| StoreError::SnapshotWrite(path.to_path_buf(), e))?;
        debug!(
            "Wrote snapshot ({} bytes) of {} station(s) to {}",
            data.len(),
            self.stations.len(),
            path.display()
        );
        Ok(())
    }

    /// Restores a store written by [`MemoryStore::save_snapshot`].
    pub fn load_snapshot(path: &Path) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path)
            .map_err(|e| StoreError::SnapshotRead(path.to_path_buf(), e))?;
        let (store, _) = bincode::serde::decode_from_slice::<MemoryStore, _>(&bytes, BINCODE_CONFIG)
            .map_err(|e| StoreError::SnapshotDecode(path.to_path_buf(), Box::from(e)))?;
        Ok(store)
    }
}

impl AggregateStore for MemoryStore {
    fn load_aggregates(&self, station: &str) -> Result<Vec<MonthlyAggregate>, StoreError> {
        Ok(self
            .station(station)
            .map(|s| s.aggregates.clone())
            .unwrap_or_default())
    }

    fn upsert_aggregates(
        &mut self,
        station: &str,
        aggregates: Vec<MonthlyAggregate>,
    ) -> Result<UpsertOutcome, StoreError> {
        let state = self.state_mut(station);
        let existing = std::mem::take(&mut state.aggregates);
        let outcome = upsert_aggregates(existing, aggregates);
        state.aggregates = outcome.aggregates.clone();
        Ok(outcome)
    }

    fn load_records(&self, station: &str) -> Result<RecordTable, StoreError> {
        Ok(self
            .station(station)
            .map(|s| s.records.clone())
            .unwrap_or_default())
    }

    fn save_records(&mut self, station: &str, records: &RecordTable) -> Result<(), StoreError> {
        self.state_mut(station).records = records.clone();
        Ok(())
    }

    fn replace_windows(
        &mut self,
        station: &str,
        windows: Vec<ClimatologyWindow>,
    ) -> Result<(), StoreError> {
        self.state_mut(station).windows = windows;
        Ok(())
    }

    fn load_windows(&self, station: &str) -> Result<Vec<ClimatologyWindow>, StoreError> {
        Ok(self
            .station(station)
            .map(|s| s.windows.clone())
            .unwrap_or_default())
    }
}
