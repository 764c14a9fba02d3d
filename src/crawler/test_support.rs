//! Scripted collaborators for controller and driver tests

use crate::crawler::extractor::{Candidate, ExtractionError, PageExtractor};
use crate::crawler::fetcher::{FetchResult, FetchedPage, PageFetcher, TransportError};
use crate::crawler::rate_limit::{REMAINING_HEADER, RESET_HEADER};
use crate::state::CrawlState;
use crate::storage::{
    CheckpointStore, Record, RunOutcome, RunRecord, SqliteStore, StoreError, StoreResult,
    StoredRecord,
};
use reqwest::header::{HeaderMap, HeaderValue};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Renders a listing page in the source markup
pub fn listing_page(entries: &[(&str, i64)]) -> String {
    let body: String = entries
        .iter()
        .map(|(name, count)| {
            format!(
                r#"<div data-prefixed-name="{}" data-subscribers-count="{}">{}</div>"#,
                name, count, name
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", body)
}

pub fn ok_page(body: &str) -> FetchedPage {
    FetchedPage {
        status_code: 200,
        headers: HeaderMap::new(),
        body: body.to_string(),
    }
}

pub fn transport_error(status_code: u16) -> TransportError {
    TransportError::Status {
        url: "https://listing.test/best".to_string(),
        status_code,
    }
}

impl FetchedPage {
    pub fn with_rate_limit(mut self, remaining: &str, reset: &str) -> Self {
        self.headers
            .insert(REMAINING_HEADER, HeaderValue::from_str(remaining).unwrap());
        self.headers
            .insert(RESET_HEADER, HeaderValue::from_str(reset).unwrap());
        self
    }
}

/// Fetcher that replays a fixed script, then fails with HTTP 503 forever
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<FetchResult>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<FetchResult>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn attempts(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Time between consecutive fetches
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls
            .windows(2)
            .map(|pair| pair[1].1.duration_since(pair[0].1))
            .collect()
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(transport_error(503)))
    }
}

/// Extractor that replays a fixed script, then reports an empty listing
pub struct FixedExtractor {
    script: Mutex<VecDeque<Result<Vec<Record>, ExtractionError>>>,
}

impl FixedExtractor {
    pub fn new(script: Vec<Result<Vec<Record>, ExtractionError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

impl PageExtractor for FixedExtractor {
    fn extract(&self, _body: &str) -> Result<Vec<Candidate>, ExtractionError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ExtractionError::EmptyListing))
            .map(|records| records.into_iter().map(Ok).collect())
    }
}

/// In-memory store whose `n`-th record upsert (1-based) fails
pub struct FailingStore {
    inner: SqliteStore,
    upserts: usize,
    fail_on: usize,
}

impl FailingStore {
    pub fn new(fail_on: usize) -> Self {
        Self {
            inner: SqliteStore::new_in_memory().unwrap(),
            upserts: 0,
            fail_on,
        }
    }
}

impl CheckpointStore for FailingStore {
    fn initialize(&mut self) -> StoreResult<()> {
        self.inner.initialize()
    }

    fn checkpoint(&self) -> StoreResult<CrawlState> {
        self.inner.checkpoint()
    }

    fn get_resume_page(&mut self) -> StoreResult<u32> {
        self.inner.get_resume_page()
    }

    fn upsert_records(&mut self, page: u32, records: &[Record]) -> StoreResult<()> {
        self.upserts += 1;
        if self.upserts == self.fail_on {
            return Err(StoreError::ConstraintViolation("disk full".to_string()));
        }
        self.inner.upsert_records(page, records)
    }

    fn set_status(&mut self, message: &str) -> StoreResult<()> {
        self.inner.set_status(message)
    }

    fn touch_last_run(&mut self) -> StoreResult<()> {
        self.inner.touch_last_run()
    }

    fn request_restart(&mut self) -> StoreResult<()> {
        self.inner.request_restart()
    }

    fn get_record(&self, key: &str) -> StoreResult<Option<StoredRecord>> {
        self.inner.get_record(key)
    }

    fn count_records(&self) -> StoreResult<u64> {
        self.inner.count_records()
    }

    fn top_records(&self, limit: usize) -> StoreResult<Vec<StoredRecord>> {
        self.inner.top_records(limit)
    }

    fn begin_run(&mut self, config_hash: &str) -> StoreResult<i64> {
        self.inner.begin_run(config_hash)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        outcome: RunOutcome,
        message: &str,
    ) -> StoreResult<()> {
        self.inner.finish_run(run_id, outcome, message)
    }

    fn latest_run(&self) -> StoreResult<Option<RunRecord>> {
        self.inner.latest_run()
    }
}
