//! Run driver - one harvest per process invocation
//!
//! The driver bootstraps the checkpoint store when its file does not exist
//! yet, runs the crawl controller exactly once, and persists the terminal
//! status so the next invocation knows whether to resume or do nothing.

use crate::config::Config;
use crate::crawler::controller::{CrawlController, CrawlOutcome};
use crate::crawler::extractor::{CommunityListExtractor, PageExtractor};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::storage::{CheckpointStore, RunOutcome, SqliteStore};
use crate::HarvestError;
use std::path::Path;

/// Opens the checkpoint store, creating and seeding it if the file is absent
///
/// Missing parent directories are created. The schema and seed rows are
/// ensured on every open, which leaves an existing checkpoint untouched and
/// completes a store whose first initialization was interrupted.
pub fn bootstrap_store(path: &Path) -> Result<SqliteStore, HarvestError> {
    if !path.exists() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        tracing::info!("Creating checkpoint store at {}", path.display());
    }

    let mut store = SqliteStore::open(path)?;
    store.initialize()?;

    Ok(store)
}

/// Runs the crawl controller once against the configured store
pub struct RunDriver<F, E> {
    config: Config,
    config_hash: String,
    fetcher: F,
    extractor: E,
}

impl RunDriver<HttpFetcher, CommunityListExtractor> {
    /// Builds a driver that fetches over HTTP and parses the community listing markup
    pub fn from_config(config: Config, config_hash: String) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self::new(config, config_hash, fetcher, CommunityListExtractor))
    }
}

impl<F, E> RunDriver<F, E>
where
    F: PageFetcher,
    E: PageExtractor,
{
    pub fn new(config: Config, config_hash: String, fetcher: F, extractor: E) -> Self {
        Self {
            config,
            config_hash,
            fetcher,
            extractor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one harvest
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - the crawl reached `Done` or `Failed`; the
    ///   outcome's status message has been persisted
    /// * `Err(HarvestError)` - the store could not be opened, read, or written
    pub async fn run(&self) -> Result<CrawlOutcome, HarvestError> {
        let mut store = bootstrap_store(self.config.store_path())?;

        store.touch_last_run()?;
        let run_id = store.begin_run(&self.config_hash)?;
        tracing::debug!("Opened run {}", run_id);

        let result = CrawlController::new(
            &self.config.crawler,
            &mut store,
            &self.fetcher,
            &self.extractor,
        )
        .run()
        .await;

        match result {
            Ok(outcome) => {
                let message = outcome.status_message();
                store.set_status(&message)?;
                store.finish_run(run_id, outcome.run_outcome(), &message)?;

                if outcome.is_done() {
                    tracing::info!("Run {} finished: {}", run_id, message);
                } else {
                    tracing::error!("Run {} failed: {}", run_id, message);
                }

                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Run {} aborted by store error: {}", run_id, e);
                if let Err(close_err) = store.finish_run(run_id, RunOutcome::Error, &e.to_string())
                {
                    tracing::warn!("Could not record aborted run {}: {}", run_id, close_err);
                }
                Err(e.into())
            }
        }
    }
}

/// Runs one harvest with the production HTTP fetcher and listing extractor
///
/// # Example
///
/// ```no_run
/// use community_harvest::config::load_config_with_hash;
/// use community_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("harvest.toml"))?;
/// let outcome = run_harvest(config, hash).await?;
/// println!("{}", outcome.status_message());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config, config_hash: String) -> Result<CrawlOutcome, HarvestError> {
    RunDriver::from_config(config, config_hash)?.run().await
}
