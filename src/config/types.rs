use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Listing harvested when no `seed-url` is configured
pub const DEFAULT_SEED_URL: &str = "https://www.reddit.com/best/communities";

/// Main configuration structure for Community-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Path of the checkpoint database
    pub fn store_path(&self) -> &Path {
        Path::new(&self.store.location)
    }
}

/// Crawl controller behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing URL; the page index is appended as a final path segment
    #[serde(rename = "seed-url", default = "default_seed_url")]
    pub seed_url: String,

    /// Records ranked below this value end the crawl
    #[serde(rename = "min-rank-metric", default = "default_min_rank_metric")]
    pub min_rank_metric: i64,

    /// Retries allowed per page before the crawl is reported as failed
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed pause between attempts on the same page (seconds)
    #[serde(rename = "retry-backoff-seconds", default = "default_retry_backoff_seconds")]
    pub retry_backoff_seconds: u64,

    /// Remaining request quota below which the crawler waits for the reset
    #[serde(rename = "rate-limit-floor", default = "default_rate_limit_floor")]
    pub rate_limit_floor: u32,

    /// Upper bound on a single page fetch (seconds)
    #[serde(rename = "request-timeout-seconds", default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl CrawlerConfig {
    /// Builds the URL of a listing page
    ///
    /// ```
    /// use community_harvest::config::CrawlerConfig;
    ///
    /// let config = CrawlerConfig {
    ///     seed_url: "https://example.com/best/".to_string(),
    ///     ..CrawlerConfig::default()
    /// };
    /// assert_eq!(config.page_url(3), "https://example.com/best/3");
    /// ```
    pub fn page_url(&self, page: u32) -> String {
        format!("{}/{}", self.seed_url.trim_end_matches('/'), page)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: default_seed_url(),
            min_rank_metric: default_min_rank_metric(),
            max_retries: default_max_retries(),
            retry_backoff_seconds: default_retry_backoff_seconds(),
            rate_limit_floor: default_rate_limit_floor(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Checkpoint store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_store_location")]
    pub location: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: default_store_location(),
        }
    }
}

fn default_seed_url() -> String {
    DEFAULT_SEED_URL.to_string()
}

fn default_min_rank_metric() -> i64 {
    20_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_seconds() -> u64 {
    1
}

fn default_rate_limit_floor() -> u32 {
    5
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_crawler_name() -> String {
    "community-harvest".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_store_location() -> String {
    "./db/database.db".to_string()
}
