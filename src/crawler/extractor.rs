//! Listing page extractor
//!
//! This module turns a listing page into ranked records. The listing marks
//! every community entry with two attributes:
//!
//! ```html
//! <div data-prefixed-name="r/rust" data-subscribers-count="312000">...</div>
//! ```
//!
//! Entries are returned in document order, which is the source's rank order
//! (descending by subscriber count). Each entry is parsed on its own, so a
//! malformed entry only matters if the crawl reads that far down the page.

use crate::storage::Record;
use scraper::{Html, Selector};
use thiserror::Error;

/// CSS selector for community entries
const ENTRY_SELECTOR: &str = "div[data-prefixed-name][data-subscribers-count]";

/// Prefix the listing puts in front of every community name
const KEY_PREFIX: &str = "r/";

/// Malformed listing content
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Entry {position} has an empty community name")]
    MissingKey { position: usize },

    #[error("Invalid subscriber count for {key}: '{value}'")]
    InvalidRankMetric { key: String, value: String },

    #[error("Page contains no community entries")]
    EmptyListing,
}

/// One listing entry: a record, or the reason it could not be read
pub type Candidate = Result<Record, ExtractionError>;

/// Turns raw page content into an ordered sequence of candidate records
///
/// The outer error rejects the whole page. Per-entry errors are left in place
/// for the stopping predicate, which ignores everything after the rank floor.
pub trait PageExtractor {
    fn extract(&self, body: &str) -> Result<Vec<Candidate>, ExtractionError>;
}

/// Extractor for the community listing markup
///
/// A page without any entries is reported as [`ExtractionError::EmptyListing`]:
/// the live listing never serves an empty page before the rank floor is
/// reached, so an empty page is an interstitial or block page.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommunityListExtractor;

impl PageExtractor for CommunityListExtractor {
    fn extract(&self, body: &str) -> Result<Vec<Candidate>, ExtractionError> {
        let selector = Selector::parse(ENTRY_SELECTOR)
            .map_err(|e| ExtractionError::Selector(format!("{:?}", e)))?;
        let document = Html::parse_document(body);

        let candidates: Vec<Candidate> = document
            .select(&selector)
            .enumerate()
            .map(|(position, element)| {
                let element = element.value();

                // Both attributes are guaranteed present by the selector
                parse_entry(
                    position,
                    element.attr("data-prefixed-name").unwrap_or_default(),
                    element.attr("data-subscribers-count").unwrap_or_default(),
                )
            })
            .collect();

        if candidates.is_empty() {
            return Err(ExtractionError::EmptyListing);
        }

        Ok(candidates)
    }
}

fn parse_entry(position: usize, name: &str, count: &str) -> Candidate {
    let key = normalize_key(name);
    if key.is_empty() {
        return Err(ExtractionError::MissingKey { position });
    }

    let rank_metric = count
        .trim()
        .parse::<i64>()
        .map_err(|_| ExtractionError::InvalidRankMetric {
            key: key.clone(),
            value: count.to_string(),
        })?;

    Ok(Record { key, rank_metric })
}

/// Normalizes a community name into its record key
///
/// Strips the `r/` prefix and lower-cases, so `r/Rust` and `rust` are the
/// same community.
///
/// # Example
///
/// ```
/// use community_harvest::crawler::normalize_key;
///
/// assert_eq!(normalize_key("r/Rust"), "rust");
/// assert_eq!(normalize_key(" AskScience "), "askscience");
/// ```
pub fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_prefix = match trimmed.get(..KEY_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(KEY_PREFIX) => &trimmed[KEY_PREFIX.len()..],
        _ => trimmed,
    };
    without_prefix.trim().to_lowercase()
}
