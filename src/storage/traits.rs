//! Storage traits and error types
//!
//! This module defines the trait interface for snapshot storage backends and
//! associated error types.

use crate::model::{HarvestResult, JoinedItem};
use crate::storage::SnapshotRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot replace failed while {stage}: {source}")]
    ReplaceFailed {
        stage: &'static str,
        source: rusqlite::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot storage backends
///
/// A backend holds exactly one snapshot: the items and reviews of the most
/// recent successful harvest. There is no merge and no history.
pub trait SnapshotStore {
    // ===== Write side =====

    /// Replaces the stored snapshot with `result`
    ///
    /// Deletes all items, deletes all reviews, inserts the new items, then
    /// the new reviews. Either the whole sequence lands or the previous
    /// snapshot stays in place and the failure is returned; it is never
    /// retried.
    fn replace_and_store(&mut self, result: &HarvestResult) -> StorageResult<()>;

    // ===== Read side =====

    /// Every stored item with its reviews nested, in stored item order
    ///
    /// Synthetic keys and row identifiers are not part of the output.
    fn read_joined(&self) -> StorageResult<Vec<JoinedItem>>;

    /// Metadata of the stored snapshot, if any harvest has been stored
    fn snapshot_info(&self) -> StorageResult<Option<SnapshotRecord>>;

    // ===== Statistics =====

    /// Counts stored items
    fn count_items(&self) -> StorageResult<u64>;

    /// Counts stored reviews
    fn count_reviews(&self) -> StorageResult<u64>;

    /// Counts stored items that have no review
    fn count_items_without_reviews(&self) -> StorageResult<u64>;
}
