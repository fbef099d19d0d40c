//! Statistics over the stored snapshot
//!
//! This module provides functionality for extracting and displaying
//! snapshot statistics from the storage layer.

use crate::storage::{SnapshotRecord, SnapshotStore};
use crate::HarvestError;

/// Snapshot statistics summary
#[derive(Debug, Clone)]
pub struct SnapshotStatistics {
    /// Total number of stored items
    pub total_items: u64,

    /// Total number of stored reviews
    pub total_reviews: u64,

    /// Items for which no review was stored
    pub items_without_reviews: u64,

    /// Metadata of the harvest the snapshot came from
    pub snapshot: Option<SnapshotRecord>,
}

impl SnapshotStatistics {
    /// Average reviews per item, 0 when nothing is stored
    pub fn reviews_per_item(&self) -> f64 {
        if self.total_items == 0 {
            0.0
        } else {
            self.total_reviews as f64 / self.total_items as f64
        }
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn SnapshotStore) -> Result<SnapshotStatistics, HarvestError> {
    Ok(SnapshotStatistics {
        total_items: storage.count_items()?,
        total_reviews: storage.count_reviews()?,
        items_without_reviews: storage.count_items_without_reviews()?,
        snapshot: storage.snapshot_info()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &SnapshotStatistics) {
    println!("=== Snapshot Statistics ===\n");

    match &stats.snapshot {
        Some(record) => {
            println!("Harvest:");
            println!("  Query: {}", record.query);
            println!(
                "  Pages traversed: {} of {} requested",
                record.pages_traversed, record.pages_requested
            );
            println!("  Stopped because: {}", record.stop_reason.to_db_string());
            println!("  Stored at: {}", record.stored_at);
            println!();
        }
        None => {
            println!("No snapshot has been stored yet.");
            println!();
        }
    }

    println!("Overview:");
    println!("  Items: {}", stats.total_items);
    println!("  Reviews: {}", stats.total_reviews);
    println!("  Items without reviews: {}", stats.items_without_reviews);
    println!("  Reviews per item: {:.1}", stats.reviews_per_item());
}
