//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the SnapshotStore trait.

use crate::model::{HarvestResult, JoinedItem, JoinedReview, StopReason};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SnapshotStore, StorageError, StorageResult};
use crate::storage::SnapshotRecord;
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Instant;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// One row of the items/sub_records left join
struct JoinedRow {
    item_key: String,
    name: Option<String>,
    price: Option<String>,
    overall_rating: Option<String>,
    specification: String,
    detail_link: String,
    review: Option<JoinedReview>,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn stage(stage: &'static str) -> impl FnOnce(rusqlite::Error) -> StorageError {
    move |source| StorageError::ReplaceFailed { stage, source }
}

impl SnapshotStore for SqliteStorage {
    // ===== Write side =====

    fn replace_and_store(&mut self, result: &HarvestResult) -> StorageResult<()> {
        let start_time = Instant::now();
        let tx = self
            .conn
            .transaction()
            .map_err(stage("opening transaction"))?;

        tx.execute("DELETE FROM items", [])
            .map_err(stage("deleting items"))?;
        tx.execute("DELETE FROM sub_records", [])
            .map_err(stage("deleting reviews"))?;

        {
            let mut insert_item = tx
                .prepare(
                    "INSERT INTO items (item_key, position, name, price, overall_rating, specification, detail_link)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(stage("inserting items"))?;

            for (position, item) in result.items.iter().enumerate() {
                let specification = serde_json::to_string(&item.specification)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;

                insert_item
                    .execute(params![
                        item.id.to_string(),
                        position as i64,
                        item.name,
                        item.price,
                        item.overall_rating,
                        specification,
                        item.detail_link,
                    ])
                    .map_err(stage("inserting items"))?;
            }

            let mut insert_review = tx
                .prepare(
                    "INSERT INTO sub_records (item_key, author, rating, title, body)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(stage("inserting reviews"))?;

            for review in &result.reviews {
                insert_review
                    .execute(params![
                        review.item_id.to_string(),
                        review.author,
                        review.rating,
                        review.title,
                        review.body,
                    ])
                    .map_err(stage("inserting reviews"))?;
            }
        }

        tx.execute("DELETE FROM snapshot", [])
            .map_err(stage("recording snapshot"))?;
        tx.execute(
            "INSERT INTO snapshot (id, query, pages_requested, pages_traversed, stop_reason, stored_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)",
            params![
                result.query,
                result.pages_requested,
                result.pages_traversed,
                result.stop_reason.to_db_string(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(stage("recording snapshot"))?;

        // Deferred foreign keys are checked here; a dangling review fails the commit
        tx.commit().map_err(stage("committing"))?;

        tracing::info!(
            "Stored {} items and {} reviews in {:?}",
            result.items.len(),
            result.reviews.len(),
            start_time.elapsed()
        );

        Ok(())
    }

    // ===== Read side =====

    fn read_joined(&self) -> StorageResult<Vec<JoinedItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.item_key, i.name, i.price, i.overall_rating, i.specification, i.detail_link,
                    s.row_id, s.author, s.rating, s.title, s.body
             FROM items i
             LEFT JOIN sub_records s ON s.item_key = i.item_key
             ORDER BY i.position, s.row_id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let review_row: Option<i64> = row.get(6)?;
                let review = match review_row {
                    Some(_) => Some(JoinedReview {
                        author: row.get(7)?,
                        rating: row.get(8)?,
                        title: row.get(9)?,
                        body: row.get(10)?,
                    }),
                    None => None,
                };

                Ok(JoinedRow {
                    item_key: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    overall_rating: row.get(3)?,
                    specification: row.get(4)?,
                    detail_link: row.get(5)?,
                    review,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut joined: Vec<JoinedItem> = Vec::new();
        let mut current_key: Option<String> = None;

        for row in rows {
            if current_key.as_deref() != Some(row.item_key.as_str()) {
                let specification: Vec<String> = serde_json::from_str(&row.specification)
                    .map_err(|e| {
                        StorageError::CorruptRecord(format!("item specification: {}", e))
                    })?;

                joined.push(JoinedItem {
                    name: row.name,
                    price: row.price,
                    overall_rating: row.overall_rating,
                    specification,
                    detail_link: row.detail_link,
                    reviews: Vec::new(),
                });
                current_key = Some(row.item_key);
            }

            if let (Some(review), Some(item)) = (row.review, joined.last_mut()) {
                item.reviews.push(review);
            }
        }

        Ok(joined)
    }

    fn snapshot_info(&self) -> StorageResult<Option<SnapshotRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT query, pages_requested, pages_traversed, stop_reason, stored_at
                 FROM snapshot WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        record
            .map(
                |(query, pages_requested, pages_traversed, stop_reason, stored_at)| {
                    let stop_reason = StopReason::from_db_string(&stop_reason).ok_or_else(|| {
                        StorageError::CorruptRecord(format!("unknown stop reason '{}'", stop_reason))
                    })?;
                    Ok(SnapshotRecord {
                        query,
                        pages_requested,
                        pages_traversed,
                        stop_reason,
                        stored_at,
                    })
                },
            )
            .transpose()
    }

    // ===== Statistics =====

    fn count_items(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_reviews(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sub_records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_items_without_reviews(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items i
             WHERE NOT EXISTS (SELECT 1 FROM sub_records s WHERE s.item_key = i.item_key)",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
