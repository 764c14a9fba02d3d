//! Statistics generation from the checkpoint store
//!
//! This module provides functionality for extracting and displaying
//! harvest progress without touching the network.

use crate::state::CrawlState;
use crate::storage::{CheckpointStore, RunRecord, StoredRecord};
use crate::HarvestError;

/// Number of highest-ranked records shown in the report
pub const TOP_RECORDS: usize = 10;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Current checkpoint
    pub checkpoint: CrawlState,

    /// Total number of distinct records
    pub record_count: u64,

    /// Highest-ranked records, largest first
    pub top_records: Vec<StoredRecord>,

    /// Most recent run, if any run was ever started
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The checkpoint store to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - The store is missing state or could not be read
pub fn load_statistics(store: &dyn CheckpointStore) -> Result<HarvestStatistics, HarvestError> {
    Ok(HarvestStatistics {
        checkpoint: store.checkpoint()?,
        record_count: store.count_records()?,
        top_records: store.top_records(TOP_RECORDS)?,
        latest_run: store.latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    let checkpoint = &stats.checkpoint;
    println!("Checkpoint:");
    println!("  Next page: {}", checkpoint.page);
    println!("  Restart requested: {}", checkpoint.retry);
    println!("  Last status: {}", checkpoint.last_status);
    match checkpoint.last_run {
        Some(at) => println!("  Last run: {}", at.to_rfc3339()),
        None => println!("  Last run: never"),
    }
    if checkpoint.is_exhausted() {
        println!("  Listing exhausted; the next run will do nothing");
    }
    println!();

    println!("Records: {}", stats.record_count);
    if !stats.top_records.is_empty() {
        println!("Top {} by rank:", stats.top_records.len());
        for (position, record) in stats.top_records.iter().enumerate() {
            println!(
                "  {:>2}. {} ({})",
                position + 1,
                record.key,
                record.rank_metric
            );
        }
    }
    println!();

    if let Some(run) = &stats.latest_run {
        println!("Latest Run #{}:", run.id);
        println!("  Started: {}", run.started_at);
        println!(
            "  Finished: {}",
            run.finished_at.as_deref().unwrap_or("still running")
        );
        println!("  Outcome: {}", run.outcome.to_db_string());
        if let Some(message) = &run.message {
            println!("  Message: {}", message);
        }
        println!("  Config hash: {}", run.config_hash);
    }
}
