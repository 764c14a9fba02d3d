//! Community-Harvest: a resumable harvester for ranked community listings
//!
//! This crate walks a paginated, rank-ordered listing page by page, upserts the
//! records it finds into SQLite, and checkpoints its position so that the next
//! invocation resumes where the last one stopped.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Community-Harvest operations
///
/// Crawl failures that exhausted the retry budget are not errors: they are
/// reported through [`crawler::CrawlOutcome::Failed`]. Anything that reaches
/// this type means the run could not be completed at all.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Community-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_harvest, CrawlOutcome};
pub use state::{CrawlPhase, CrawlState};
pub use storage::{CheckpointStore, Record, SqliteStore};
