//! Output module for reporting harvest progress
//!
//! This module handles:
//! - Collecting the checkpoint, record totals and run history from the store
//! - Printing a human-readable status report

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};
