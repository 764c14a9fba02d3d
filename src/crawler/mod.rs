//! Crawler module for walking the ranked listing
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with typed transport failures
//! - Listing extraction into ranked records
//! - Rate-limit telemetry and the waits it implies
//! - The crawl controller state machine and the per-invocation run driver

mod controller;
mod driver;
mod extractor;
mod fetcher;
mod rate_limit;

#[cfg(test)]
mod test_support;

pub use controller::{apply_stopping_predicate, Acceptance, CrawlController, CrawlOutcome};
pub use driver::{bootstrap_store, run_harvest, RunDriver};
pub use extractor::{
    normalize_key, Candidate, CommunityListExtractor, ExtractionError, PageExtractor,
};
pub use fetcher::{
    build_http_client, FetchResult, FetchedPage, HttpFetcher, PageFetcher, TransportError,
};
pub use rate_limit::RateLimitTelemetry;
