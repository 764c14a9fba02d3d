//! Persisted crawl checkpoint

use chrono::{DateTime, Utc};

/// Status written when the listing has been exhausted
///
/// This exact string is what the store checks to decide that a run has
/// nothing left to do.
pub const STATUS_COMPLETED: &str = "Scraping completed successfully";

/// Status seeded into a freshly initialized store
pub const STATUS_INITIALIZED: &str = "Initialized";

/// Status written when a pending restart request is consumed
pub const STATUS_RESTART_REQUESTED: &str = "Restart requested";

/// Snapshot of the checkpoint rows in the `state` table
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlState {
    /// Next page to fetch (>= 1)
    pub page: u32,

    /// Restart from page 1 on the next run
    pub retry: bool,

    /// Message left by the most recent run
    pub last_status: String,

    /// When the most recent run started
    pub last_run: Option<DateTime<Utc>>,
}

impl CrawlState {
    /// True when the next run should do nothing
    pub fn is_exhausted(&self) -> bool {
        !self.retry && self.last_status == STATUS_COMPLETED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(retry: bool, last_status: &str) -> CrawlState {
        CrawlState {
            page: 4,
            retry,
            last_status: last_status.to_string(),
            last_run: None,
        }
    }

    #[test]
    fn test_is_exhausted() {
        assert!(state(false, STATUS_COMPLETED).is_exhausted());
        assert!(!state(true, STATUS_COMPLETED).is_exhausted());
        assert!(!state(false, STATUS_INITIALIZED).is_exhausted());
        assert!(!state(false, "Failed to scrape page 4 after 3 retries. Error: boom").is_exhausted());
    }
}
