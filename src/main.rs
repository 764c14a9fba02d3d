//! Community-Harvest main entry point
//!
//! This is the command-line interface for the resumable listing harvester.

use clap::Parser;
use community_harvest::config::{load_config_with_hash, Config};
use community_harvest::crawler::{bootstrap_store, run_harvest};
use community_harvest::storage::{CheckpointStore, SqliteStore};
use community_harvest::HarvestError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for a crawl that exhausted its retry budget
const EXIT_CRAWL_FAILED: u8 = 2;

/// Community-Harvest: a resumable harvester for ranked community listings
///
/// Each invocation resumes from the page recorded in the checkpoint store,
/// upserts the communities it finds, and stops once the listing drops below
/// the configured rank floor.
#[derive(Parser, Debug)]
#[command(name = "community-harvest")]
#[command(version)]
#[command(about = "A resumable harvester for ranked community listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start over from the first page, even if the previous run completed
    #[arg(long, conflicts_with = "status")]
    restart: bool,

    /// Show the checkpoint and harvest statistics, then exit
    #[arg(long, conflicts_with = "restart")]
    status: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.status {
        handle_status(&config)
    } else {
        handle_harvest(config, config_hash, cli.restart).await
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("community_harvest=info,warn"),
            1 => EnvFilter::new("community_harvest=debug,info"),
            2 => EnvFilter::new("community_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --status mode: reports from an existing store without crawling
fn handle_status(config: &Config) -> Result<ExitCode, HarvestError> {
    use community_harvest::output::{load_statistics, print_statistics};

    let path = config.store_path();
    println!("Database: {}\n", path.display());

    if !path.exists() {
        println!("No harvest has run yet.");
        return Ok(ExitCode::SUCCESS);
    }

    let store = SqliteStore::open(path)?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(ExitCode::SUCCESS)
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    config_hash: String,
    restart: bool,
) -> Result<ExitCode, HarvestError> {
    if restart {
        let mut store = bootstrap_store(config.store_path())?;
        store.request_restart()?;
        tracing::info!("Restart requested; harvesting from the first page");
    } else {
        tracing::info!("Starting harvest (will resume from the stored checkpoint)");
    }

    tracing::info!(
        "Seed: {}, rank floor: {}, max retries: {}",
        config.crawler.seed_url,
        config.crawler.min_rank_metric,
        config.crawler.max_retries
    );

    let outcome = run_harvest(config, config_hash).await?;
    println!("{}", outcome.status_message());

    if outcome.is_done() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_CRAWL_FAILED))
    }
}
