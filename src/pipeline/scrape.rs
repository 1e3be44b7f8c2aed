// src/pipeline/scrape.rs

//! Scrape pipeline: discover, fetch, reshape, merge, save.

use crate::error::Result;
use crate::pipeline::merge::{self, RunState};
use crate::pipeline::reshape::reshape;
use crate::services::{AirlineDirectory, SalaryTableFetcher};
use crate::storage::{SnapshotStorage, WriteMetadata};

/// Summary of a scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub state: RunState,
    /// Airlines with a well-formed directory label
    pub discovered: usize,
    /// Directory links whose label could not be parsed
    pub rejected_links: usize,
    /// Airlines fetched in this run
    pub scraped: usize,
    pub fetch_failures: usize,
    pub new_records: usize,
    pub replaced: usize,
    pub appended: usize,
    pub snapshot: WriteMetadata,
}

/// Run the scraper against the stored snapshot.
///
/// With a non-empty snapshot only airlines whose identity changed are
/// fetched; `force_full` ignores the snapshot and rebuilds it.
pub async fn run_scrape(
    storage: &dyn SnapshotStorage,
    directory: &AirlineDirectory,
    fetcher: &SalaryTableFetcher,
    force_full: bool,
) -> Result<ScrapeSummary> {
    let previous = storage.load_records().await?;
    let state = RunState::detect(&previous, force_full);
    log::info!(
        "Starting scrape ({:?}, {} records in snapshot)",
        state,
        previous.len()
    );

    let discovery = directory.discover().await?;

    let (targets, base, raw_base) = match state {
        RunState::NoPriorData => (discovery.airlines.clone(), Vec::new(), Vec::new()),
        RunState::Incremental => {
            let targets = merge::airlines_to_scrape(&discovery.airlines, &previous);
            log::info!(
                "{} of {} airlines changed since the last snapshot",
                targets.len(),
                discovery.airlines.len()
            );
            (targets, previous, storage.load_raw().await?)
        }
    };

    let outcomes = fetcher.fetch_all(&targets).await;
    let fetch_failures = outcomes.iter().filter(|o| !o.is_success()).count();
    storage
        .save_raw(&merge::merge_outcomes(raw_base, &outcomes))
        .await?;

    let new_records = reshape(&outcomes);
    let merged = merge::union(base, &new_records);
    let snapshot = storage.save_records(&merged.records).await?;

    log::info!(
        "Saved {} records to {} ({} replaced, {} appended)",
        snapshot.count,
        snapshot.location,
        merged.replaced,
        merged.appended
    );

    Ok(ScrapeSummary {
        state,
        discovered: discovery.airlines.len(),
        rejected_links: discovery.rejected.len(),
        scraped: targets.len(),
        fetch_failures,
        new_records: new_records.len(),
        replaced: merged.replaced,
        appended: merged.appended,
        snapshot,
    })
}

/// Rebuild the snapshot from the stored raw outcomes, offline.
pub async fn run_rebuild(storage: &dyn SnapshotStorage) -> Result<WriteMetadata> {
    let outcomes = storage.load_raw().await?;
    log::info!("Reshaping {} stored fetch outcomes", outcomes.len());

    let records = reshape(&outcomes);
    let snapshot = storage.save_records(&records).await?;
    log::info!("Saved {} records to {}", snapshot.count, snapshot.location);
    Ok(snapshot)
}
