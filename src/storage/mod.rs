//! Storage module for persisting harvest snapshots
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Atomic replacement of the item/review snapshot
//! - The joined read view with internal keys stripped
//! - Snapshot metadata and counts

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{SnapshotStore, StorageError, StorageResult};

use crate::model::StopReason;
use crate::HarvestError;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, HarvestError> {
    SqliteStorage::new(path)
}

/// Describes the harvest the stored snapshot came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub query: String,
    pub pages_requested: u32,
    pub pages_traversed: u32,
    pub stop_reason: StopReason,
    pub stored_at: String,
}
