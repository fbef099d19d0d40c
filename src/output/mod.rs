//! Output module for rendering the stored snapshot
//!
//! This module handles:
//! - Generating a markdown report of the joined view
//! - Exporting the joined view as JSON
//! - Loading and printing snapshot statistics

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::{load_statistics, print_statistics, SnapshotStatistics};

use crate::model::JoinedItem;
use crate::storage::{SnapshotStore, StorageError};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Serializes the joined view as pretty JSON, absent fields as `"NA"`
pub fn joined_to_json(items: &[JoinedItem]) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

/// Reads the stored snapshot and writes its markdown report to `output_path`
///
/// Returns the number of items written.
pub fn export_summary(storage: &dyn SnapshotStore, output_path: &Path) -> OutputResult<usize> {
    let items = storage.read_joined()?;
    let snapshot = storage.snapshot_info()?;
    generate_markdown_report(&items, snapshot.as_ref(), output_path)?;
    Ok(items.len())
}
