//! Pilot salary scraper CLI
//!
//! Scrapes airline salary tables into a local snapshot and publishes it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pilot_salaries::{
    error::Result,
    models::Config,
    pipeline,
    services::{AirlineDirectory, AlgoliaPublisher, SalaryTableFetcher},
    storage::{LocalStorage, SnapshotStorage},
    utils::http,
};

/// Airline pilot salary scraper
#[derive(Parser, Debug)]
#[command(name = "pilot-salaries", version, about = "Airline pilot salary scraper")]
struct Cli {
    /// Path to storage directory containing config and snapshots
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape changed airlines and merge them into the snapshot
    Scrape {
        /// Ignore the existing snapshot and scrape every airline
        #[arg(long)]
        full: bool,
    },

    /// Rebuild the snapshot from the raw data of the last scrape
    Rebuild,

    /// Publish the snapshot to the search index
    Publish,

    /// Run full pipeline: Scrape → Publish
    Pipeline {
        /// Ignore the existing snapshot and scrape every airline
        #[arg(long)]
        full: bool,

        /// Stop after scraping
        #[arg(long)]
        skip_publish: bool,
    },

    /// Validate configuration
    Validate,

    /// Show current snapshot info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load `.env` files from the working directory and the storage directory.
///
/// Variables already set in the environment are not overridden.
fn load_env_files(storage_dir: &Path) {
    for path in [PathBuf::from(".env"), storage_dir.join(".env")] {
        match dotenvy::from_path(&path) {
            Ok(()) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Failed to read {}: {}", path.display(), e),
        }
    }
}

async fn scrape(config: &Arc<Config>, storage: &LocalStorage, full: bool) -> Result<()> {
    let client = http::create_async_client(&config.crawler)?;
    let directory = AirlineDirectory::new(config, client.clone());
    let fetcher = SalaryTableFetcher::new(Arc::clone(config), client);

    let summary = pipeline::run_scrape(storage, &directory, &fetcher, full).await?;
    log::info!(
        "Scraped {} of {} airlines: {} failed, {} links rejected, {} records in snapshot",
        summary.scraped,
        summary.discovered,
        summary.fetch_failures,
        summary.rejected_links,
        summary.snapshot.count
    );
    Ok(())
}

async fn publish(config: &Config, storage: &LocalStorage) -> Result<()> {
    let client = http::create_async_client(&config.crawler)?;
    let publisher = AlgoliaPublisher::from_env(client, &config.index)?;
    pipeline::run_publish(storage, &publisher).await?;
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    load_env_files(&cli.storage_dir);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Arc::new(Config::load_or_default(&config_path));
    let storage = LocalStorage::new(&cli.storage_dir, &config.paths);

    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    match cli.command {
        Command::Scrape { full } => {
            config.validate()?;
            scrape(&config, &storage, full).await?;
        }

        Command::Rebuild => {
            pipeline::run_rebuild(&storage).await?;
        }

        Command::Publish => {
            config.validate()?;
            publish(&config, &storage).await?;
        }

        Command::Pipeline { full, skip_publish } => {
            config.validate()?;
            let total = if skip_publish { 1 } else { 2 };

            log::info!("Step 1/{}: Scraping salaries...", total);
            scrape(&config, &storage, full).await?;

            if !skip_publish {
                log::info!("Step 2/2: Publishing to index '{}'...", config.index.name);
                publish(&config, &storage).await?;
            }

            log::info!("Pipeline complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("Source: {}", config.source.base_url);
            log::info!("Index: {}", config.index.name);

            let records = storage.load_records().await?;
            if records.is_empty() {
                log::info!("No snapshot found yet.");
            } else {
                let airlines = pipeline::merge::identities(&records).len();
                log::info!(
                    "Snapshot {}: {} records from {} airlines",
                    storage.snapshot_path().display(),
                    records.len(),
                    airlines
                );
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
