//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the controller's position in the fetch/extract/rate-check cycle
//! - `CrawlState`: the persisted checkpoint (`page`, `retry`, `last_status`, `last_run`)

mod crawl_phase;
mod crawl_state;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use crawl_state::{CrawlState, STATUS_COMPLETED, STATUS_INITIALIZED, STATUS_RESTART_REQUESTED};
