//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Community-Harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawl checkpoint: one row per setting
CREATE TABLE IF NOT EXISTS state (
    name TEXT PRIMARY KEY,
    value
);

-- Harvested communities
CREATE TABLE IF NOT EXISTS communities (
    key TEXT PRIMARY KEY,
    rank_metric INTEGER NOT NULL,
    last_updated TEXT
);

CREATE INDEX IF NOT EXISTS idx_communities_rank ON communities(rank_metric);

-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    outcome TEXT NOT NULL,
    message TEXT
);
"#;

/// Seed rows for the checkpoint; `OR IGNORE` keeps an existing checkpoint intact
pub const SEED_STATE_SQL: &str = r#"
INSERT OR IGNORE INTO state (name, value) VALUES ('page', 1);
INSERT OR IGNORE INTO state (name, value) VALUES ('retry', 0);
INSERT OR IGNORE INTO state (name, value) VALUES ('last_status', 'Initialized');
INSERT OR IGNORE INTO state (name, value) VALUES ('last_run', NULL);
"#;

/// Initializes the database schema and seeds the checkpoint
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&format!("BEGIN;\n{}\n{}\nCOMMIT;", SCHEMA_SQL, SEED_STATE_SQL))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::STATUS_INITIALIZED;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_seed_status_matches_constant() {
        assert!(SEED_STATE_SQL.contains(&format!("'{}'", STATUS_INITIALIZED)));
    }

    #[test]
    fn test_schema_is_idempotent_and_keeps_checkpoint() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute("UPDATE state SET value = 7 WHERE name = 'page'", [])
            .unwrap();

        initialize_schema(&conn).unwrap();

        let page: i64 = conn
            .query_row("SELECT value FROM state WHERE name = 'page'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(page, 7);
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["state", "communities", "runs"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }

        let state_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM state", [], |row| row.get(0))
            .unwrap();
        assert_eq!(state_rows, 4);
    }
}
