//! Storage module for persisting harvest data
//!
//! This module owns the checkpoint store:
//! - SQLite schema management
//! - Crawl checkpoint (`page`, `retry`, `last_status`, `last_run`)
//! - Atomic record upserts that advance the page in the same transaction
//! - Run history for auditing past invocations

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{CheckpointStore, StoreError, StoreResult};

/// A community observed on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Normalized community name (unique)
    pub key: String,

    /// Ranking value the listing is sorted by (subscriber count)
    pub rank_metric: i64,
}

impl Record {
    pub fn new(key: impl Into<String>, rank_metric: i64) -> Self {
        Self {
            key: key.into(),
            rank_metric,
        }
    }
}

/// Represents a community row in the database
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub key: String,
    pub rank_metric: i64,
    pub last_updated: Option<String>,
}

/// Represents a harvest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub outcome: RunOutcome,
    pub message: Option<String>,
}

/// How a harvest run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Still running, or the process died before finishing
    Running,
    /// Listing exhausted
    Done,
    /// A page ran out of retries
    Failed,
    /// Aborted by a store error
    Error,
}

impl RunOutcome {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_outcome_roundtrip() {
        for outcome in &[
            RunOutcome::Running,
            RunOutcome::Done,
            RunOutcome::Failed,
            RunOutcome::Error,
        ] {
            let db_str = outcome.to_db_string();
            assert_eq!(Some(*outcome), RunOutcome::from_db_string(db_str));
        }
    }

    #[test]
    fn test_run_outcome_invalid() {
        assert_eq!(RunOutcome::from_db_string("completed"), None);
    }
}
