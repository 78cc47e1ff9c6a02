use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read snapshot file '{0}'")]
    SnapshotRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write snapshot file '{0}'")]
    SnapshotWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode snapshot data from '{0}'")]
    SnapshotDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode snapshot data")]
    SnapshotEncode(#[source] Box<bincode::error::EncodeError>),

    #[error("No stored state for station '{0}'")]
    UnknownStation(String),
}
