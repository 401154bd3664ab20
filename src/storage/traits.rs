//! Storage trait definitions

use crate::tip::{ContentRecord, CounterKind, TipId};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Seed file error: {0}")]
    Seed(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Backing store for the catalogue.
///
/// The catalogue needs exactly two things from a store: the initial set of
/// records, loaded once, and an optional place to record counter bumps.
pub trait TipStore: Send + Sync {
    /// Load every published record, in catalogue order
    fn load_initial_records(&self) -> StorageResult<Vec<ContentRecord>>;

    /// Persist a single counter increment.
    ///
    /// Stores that do not keep counters accept and discard the call.
    fn persist_increment(&self, _id: &TipId, _kind: CounterKind) -> StorageResult<()> {
        Ok(())
    }
}

/// Extension trait for opening stores from paths
pub trait OpenStore: TipStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}

/// A fixed list of records held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<ContentRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<ContentRecord>) -> Self {
        Self { records }
    }
}

impl TipStore for MemoryStore {
    fn load_initial_records(&self) -> StorageResult<Vec<ContentRecord>> {
        Ok(self.records.clone())
    }
}
