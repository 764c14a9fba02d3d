//! Crawl controller - the checkpointed pagination loop
//!
//! This module drives one harvest of the listing:
//! - Deciding between resume, restart, and no-op from the checkpoint
//! - Fetching pages one at a time with a per-page retry budget
//! - Applying the stopping predicate to the ranked records
//! - Committing each page's records and page advance atomically
//! - Honouring rate-limit telemetry between pages

use crate::config::CrawlerConfig;
use crate::crawler::extractor::{Candidate, ExtractionError, PageExtractor};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::rate_limit::RateLimitTelemetry;
use crate::state::{CrawlPhase, STATUS_COMPLETED};
use crate::storage::{CheckpointStore, Record, RunOutcome, StoreResult};

/// Terminal result of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The listing is exhausted (this run or a previous one)
    Done {
        /// Pages committed during this run
        pages_fetched: u32,
        /// Records upserted during this run
        records_upserted: u64,
    },

    /// A page ran out of retries; its records were not committed
    Failed {
        page: u32,
        max_retries: u32,
        error: String,
    },
}

impl CrawlOutcome {
    /// Human-readable status line, persisted as `last_status`
    pub fn status_message(&self) -> String {
        match self {
            Self::Done { .. } => STATUS_COMPLETED.to_string(),
            Self::Failed {
                page,
                max_retries,
                error,
            } => format!(
                "Failed to scrape page {} after {} retries. Error: {}",
                page, max_retries, error
            ),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    pub fn run_outcome(&self) -> RunOutcome {
        match self {
            Self::Done { .. } => RunOutcome::Done,
            Self::Failed { .. } => RunOutcome::Failed,
        }
    }
}

/// Records accepted from one page by the stopping predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    /// Records ranked at or above the floor, in listing order
    pub accepted: Vec<Record>,

    /// True if a record below the floor was seen; the crawl ends after this page
    pub exhausted: bool,
}

/// Applies the stopping predicate to one page of ranked candidates
///
/// Candidates are walked in listing order. The first record below `floor`
/// ends the walk: it and everything after it are dropped unread, so a
/// malformed entry past that point never fails the page. The listing is
/// sorted by rank, so nothing after the cut can qualify, on this page or any
/// later one. A malformed entry before the cut rejects the whole page.
pub fn apply_stopping_predicate<I>(
    candidates: I,
    floor: i64,
) -> Result<Acceptance, ExtractionError>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut accepted = Vec::new();

    for candidate in candidates {
        let record = candidate?;
        if record.rank_metric < floor {
            return Ok(Acceptance {
                accepted,
                exhausted: true,
            });
        }
        accepted.push(record);
    }

    Ok(Acceptance {
        accepted,
        exhausted: false,
    })
}

/// Drives the page-by-page fetch loop against a checkpoint store
pub struct CrawlController<'a, S, F, E> {
    config: &'a CrawlerConfig,
    store: &'a mut S,
    fetcher: &'a F,
    extractor: &'a E,
    phase: CrawlPhase,
}

impl<'a, S, F, E> CrawlController<'a, S, F, E>
where
    S: CheckpointStore,
    F: PageFetcher,
    E: PageExtractor,
{
    pub fn new(config: &'a CrawlerConfig, store: &'a mut S, fetcher: &'a F, extractor: &'a E) -> Self {
        Self {
            config,
            store,
            fetcher,
            extractor,
            phase: CrawlPhase::ResumeCheck,
        }
    }

    /// Current phase (terminal once `run` has returned `Ok`)
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to a terminal state
    ///
    /// Fetch and extraction failures are retried and, once the budget is
    /// spent, reported as [`CrawlOutcome::Failed`]. Store failures are never
    /// retried: they abort the run and are returned as `Err`.
    pub async fn run(&mut self) -> StoreResult<CrawlOutcome> {
        let mut page = self.store.get_resume_page()?;
        if page == 0 {
            tracing::info!("Nothing to scrape. Request a restart to scrape again.");
            self.transition(CrawlPhase::Done);
            return Ok(CrawlOutcome::Done {
                pages_fetched: 0,
                records_upserted: 0,
            });
        }

        tracing::info!("Starting crawl at page {}", page);
        self.transition(CrawlPhase::Fetching);

        let mut retries: u32 = 0;
        let mut pages_fetched: u32 = 0;
        let mut records_upserted: u64 = 0;

        loop {
            let url = self.config.page_url(page);
            tracing::info!("Scraping {}", url);

            let fetched = match self.fetcher.fetch(&url).await {
                Ok(fetched) => fetched,
                Err(e) => match self.retry_or_fail(page, &mut retries, e.to_string()).await {
                    Some(outcome) => return Ok(outcome),
                    None => continue,
                },
            };

            self.transition(CrawlPhase::Extracting);
            let floor = self.config.min_rank_metric;
            let acceptance = self
                .extractor
                .extract(&fetched.body)
                .and_then(|candidates| apply_stopping_predicate(candidates, floor));
            let Acceptance {
                accepted,
                exhausted,
            } = match acceptance {
                Ok(acceptance) => acceptance,
                Err(e) => {
                    let error = format!("Malformed page {}: {}", url, e);
                    match self.retry_or_fail(page, &mut retries, error).await {
                        Some(outcome) => return Ok(outcome),
                        None => continue,
                    }
                }
            };

            self.store.upsert_records(page, &accepted)?;
            pages_fetched += 1;
            records_upserted += accepted.len() as u64;
            retries = 0;

            tracing::debug!(
                "Committed page {}: {} records accepted",
                page,
                accepted.len()
            );

            if exhausted {
                tracing::info!(
                    "Reached records below {} on page {}; listing exhausted",
                    self.config.min_rank_metric,
                    page
                );
                self.transition(CrawlPhase::Done);
                return Ok(CrawlOutcome::Done {
                    pages_fetched,
                    records_upserted,
                });
            }

            self.transition(CrawlPhase::RateCheck);
            let telemetry = RateLimitTelemetry::from_headers(&fetched.headers);
            if let Some(wait) =
                telemetry.required_wait(self.config.rate_limit_floor, self.config.retry_backoff())
            {
                tracing::warn!("Rate limit reached. Waiting {} seconds", wait.as_secs());
                tokio::time::sleep(wait).await;
            }

            page += 1;
            self.transition(CrawlPhase::Fetching);
        }
    }

    /// Counts a failed attempt on `page`
    ///
    /// Returns the `Failed` outcome once the budget is spent; otherwise waits
    /// out the backoff and returns `None` so the caller re-fetches the page.
    async fn retry_or_fail(
        &mut self,
        page: u32,
        retries: &mut u32,
        error: String,
    ) -> Option<CrawlOutcome> {
        *retries += 1;

        if *retries > self.config.max_retries {
            tracing::error!(
                "Giving up on page {} after {} retries: {}",
                page,
                self.config.max_retries,
                error
            );
            self.transition(CrawlPhase::Failed);
            return Some(CrawlOutcome::Failed {
                page,
                max_retries: self.config.max_retries,
                error,
            });
        }

        tracing::warn!(
            "Attempt {} for page {} failed: {}",
            *retries,
            page,
            error
        );
        self.transition(CrawlPhase::Fetching);
        tokio::time::sleep(self.config.retry_backoff()).await;
        None
    }

    fn transition(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal crawl transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}
