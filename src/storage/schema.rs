//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Review-Harvester
//! database. `items` and `sub_records` hold the current snapshot; the
//! foreign key is deferred so a replace may delete parents before children.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Listing entries of the current snapshot
CREATE TABLE IF NOT EXISTS items (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_key TEXT NOT NULL UNIQUE,
    position INTEGER NOT NULL,
    name TEXT,
    price TEXT,
    overall_rating TEXT,
    specification TEXT NOT NULL,
    detail_link TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_position ON items(position);

-- Reviews of the current snapshot
CREATE TABLE IF NOT EXISTS sub_records (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_key TEXT NOT NULL REFERENCES items(item_key) DEFERRABLE INITIALLY DEFERRED,
    author TEXT,
    rating TEXT,
    title TEXT,
    body TEXT
);

CREATE INDEX IF NOT EXISTS idx_sub_records_item ON sub_records(item_key);

-- Describes the harvest the current snapshot came from
CREATE TABLE IF NOT EXISTS snapshot (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    query TEXT NOT NULL,
    pages_requested INTEGER NOT NULL,
    pages_traversed INTEGER NOT NULL,
    stop_reason TEXT NOT NULL,
    stored_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
