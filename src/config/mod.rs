//! Configuration module for Community-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every option has a default, so an empty file yields a usable configuration
//! pointed at the public community listing.
//!
//! # Example
//!
//! ```no_run
//! use community_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvesting from: {}", config.crawler.seed_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, StoreConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
