//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CheckpointStore trait.

use crate::state::{CrawlState, STATUS_COMPLETED, STATUS_RESTART_REQUESTED};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CheckpointStore, StoreError, StoreResult};
use crate::storage::{Record, RunOutcome, RunRecord, StoredRecord};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, Value};
use rusqlite::{params, Connection, OptionalExtension, ToSql, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits for another process holding the database lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite checkpoint store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file without touching the schema
    ///
    /// Call [`CheckpointStore::initialize`] afterwards when the file is new.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self { conn })
    }

    /// Creates an initialized in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Direct access to the connection (for tests that corrupt state)
    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Reads a single checkpoint value
fn read_state<T: FromSql>(conn: &Connection, name: &'static str) -> StoreResult<T> {
    conn.query_row(
        "SELECT value FROM state WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(StoreError::MissingState(name))
}

/// Reads and validates the page counter
fn read_page(conn: &Connection) -> StoreResult<u32> {
    let raw: i64 = read_state(conn, "page")?;
    u32::try_from(raw)
        .ok()
        .filter(|page| *page >= 1)
        .ok_or(StoreError::InvalidState {
            name: "page",
            value: raw.to_string(),
        })
}

/// Reads the restart flag
///
/// Accepts the integer the store writes as well as `True`/`False` text set by
/// hand, in any case.
fn read_retry(conn: &Connection) -> StoreResult<bool> {
    let raw: Value = read_state(conn, "retry")?;
    let flag = match &raw {
        Value::Integer(n) => Some(*n != 0),
        Value::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };

    flag.ok_or_else(|| StoreError::InvalidState {
        name: "retry",
        value: format!("{:?}", raw),
    })
}

/// Overwrites a single checkpoint value
fn write_state(conn: &Connection, name: &'static str, value: &dyn ToSql) -> StoreResult<()> {
    let updated = conn.execute(
        "UPDATE state SET value = ?1 WHERE name = ?2",
        params![value, name],
    )?;

    if updated != 1 {
        return Err(StoreError::MissingState(name));
    }

    Ok(())
}

impl CheckpointStore for SqliteStore {
    // ===== Checkpoint =====

    fn initialize(&mut self) -> StoreResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    fn checkpoint(&self) -> StoreResult<CrawlState> {
        let page = read_page(&self.conn)?;
        let retry = read_retry(&self.conn)?;
        let last_status: String = read_state(&self.conn, "last_status")?;
        let last_run: Option<String> = read_state(&self.conn, "last_run")?;

        let last_run = match last_run {
            Some(raw) => Some(raw.parse::<DateTime<Utc>>().map_err(|_| {
                StoreError::InvalidState {
                    name: "last_run",
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        Ok(CrawlState {
            page,
            retry,
            last_status,
            last_run,
        })
    }

    fn get_resume_page(&mut self) -> StoreResult<u32> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let retry = read_retry(&tx)?;
        if retry {
            write_state(&tx, "page", &1_i64)?;
            write_state(&tx, "retry", &false)?;
            write_state(&tx, "last_status", &STATUS_RESTART_REQUESTED)?;
            tx.commit()?;
            return Ok(1);
        }

        let last_status: String = read_state(&tx, "last_status")?;
        if last_status == STATUS_COMPLETED {
            return Ok(0);
        }

        let page = read_page(&tx)?;
        Ok(page)
    }

    fn upsert_records(&mut self, page: u32, records: &[Record]) -> StoreResult<()> {
        if let Some(record) = records.iter().find(|r| r.key.is_empty()) {
            return Err(StoreError::ConstraintViolation(format!(
                "record with empty key (rank_metric {})",
                record.rank_metric
            )));
        }

        let now = Utc::now().to_rfc3339();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO communities (key, rank_metric, last_updated) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     rank_metric = excluded.rank_metric,
                     last_updated = excluded.last_updated",
            )?;

            for record in records {
                stmt.execute(params![record.key, record.rank_metric, now])?;
            }
        }

        let stored = read_page(&tx)?;
        if stored != page {
            return Err(StoreError::PageConflict {
                fetched: page,
                stored,
            });
        }
        write_state(&tx, "page", &(i64::from(page) + 1))?;

        tx.commit()?;
        Ok(())
    }

    fn set_status(&mut self, message: &str) -> StoreResult<()> {
        write_state(&self.conn, "last_status", &message)
    }

    fn touch_last_run(&mut self) -> StoreResult<()> {
        write_state(&self.conn, "last_run", &Utc::now().to_rfc3339())
    }

    fn request_restart(&mut self) -> StoreResult<()> {
        write_state(&self.conn, "retry", &true)
    }

    // ===== Records =====

    fn get_record(&self, key: &str) -> StoreResult<Option<StoredRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT key, rank_metric, last_updated FROM communities WHERE key = ?1",
                params![key],
                |row| {
                    Ok(StoredRecord {
                        key: row.get(0)?,
                        rank_metric: row.get(1)?,
                        last_updated: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    fn count_records(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM communities", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn top_records(&self, limit: usize) -> StoreResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, rank_metric, last_updated FROM communities
             ORDER BY rank_metric DESC, key ASC LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit as i64], |row| {
                Ok(StoredRecord {
                    key: row.get(0)?,
                    rank_metric: row.get(1)?,
                    last_updated: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    // ===== Run History =====

    fn begin_run(&mut self, config_hash: &str) -> StoreResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, outcome) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunOutcome::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        outcome: RunOutcome,
        message: &str,
    ) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET outcome = ?1, message = ?2, finished_at = ?3 WHERE id = ?4",
            params![outcome.to_db_string(), message, now, run_id],
        )?;

        if updated == 0 {
            return Err(StoreError::RunNotFound(run_id));
        }

        Ok(())
    }

    fn latest_run(&self) -> StoreResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, outcome, message
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        outcome: RunOutcome::from_db_string(&row.get::<_, String>(4)?)
                            .unwrap_or(RunOutcome::Running),
                        message: row.get(5)?,
                    })
                },
            )
            .optional()?;

        Ok(run)
    }
}
