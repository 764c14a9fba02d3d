//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint store backends and
//! associated error types.

use crate::state::CrawlState;
use crate::storage::{Record, RunOutcome, RunRecord, StoredRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Missing state row: {0}")]
    MissingState(&'static str),

    #[error("Invalid value for state row {name}: {value}")]
    InvalidState { name: &'static str, value: String },

    #[error("Page {fetched} was committed out of turn; the checkpoint is at page {stored}")]
    PageConflict { fetched: u32, stored: u32 },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for checkpoint store implementations
///
/// Every write that touches both records and the page counter happens in a
/// single transaction, so a crash or a concurrent run can never observe
/// records from a page whose advance was not committed (or the reverse).
pub trait CheckpointStore {
    // ===== Checkpoint =====

    /// Creates the schema if absent and seeds `page=1`, `retry=false`,
    /// `last_status="Initialized"`
    ///
    /// Existing state rows are left untouched.
    fn initialize(&mut self) -> StoreResult<()>;

    /// Reads the full checkpoint
    fn checkpoint(&self) -> StoreResult<CrawlState>;

    /// Decides where the next crawl starts
    ///
    /// # Returns
    ///
    /// * `1` - a restart was requested; the page counter has been reset and the
    ///   flag cleared
    /// * `0` - the listing is already exhausted, nothing to do
    /// * otherwise the stored page
    fn get_resume_page(&mut self) -> StoreResult<u32>;

    /// Upserts the records found on `page` and advances the checkpoint to
    /// `page + 1`, atomically
    ///
    /// An empty batch still advances the page. Fails with
    /// [`StoreError::PageConflict`] and writes nothing if the stored page is no
    /// longer `page`, which happens when another run committed it first.
    fn upsert_records(&mut self, page: u32, records: &[Record]) -> StoreResult<()>;

    /// Persists a status message
    fn set_status(&mut self, message: &str) -> StoreResult<()>;

    /// Stamps `last_run` with the current time
    fn touch_last_run(&mut self) -> StoreResult<()>;

    /// Sets the `retry` flag so the next run starts over from page 1
    fn request_restart(&mut self) -> StoreResult<()>;

    // ===== Records =====

    /// Gets a record by key
    fn get_record(&self, key: &str) -> StoreResult<Option<StoredRecord>>;

    /// Counts stored records
    fn count_records(&self) -> StoreResult<u64>;

    /// Gets the highest-ranked records
    fn top_records(&self, limit: usize) -> StoreResult<Vec<StoredRecord>>;

    // ===== Run History =====

    /// Opens a run row and returns its ID
    fn begin_run(&mut self, config_hash: &str) -> StoreResult<i64>;

    /// Closes a run row with its outcome and terminal message
    fn finish_run(&mut self, run_id: i64, outcome: RunOutcome, message: &str)
        -> StoreResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StoreResult<Option<RunRecord>>;
}
