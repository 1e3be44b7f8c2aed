// src/pipeline/publish.rs

//! Publish the stored snapshot to the search index.

use crate::error::Result;
use crate::services::{IndexPublisher, PublishSummary};
use crate::storage::SnapshotStorage;

/// Push every snapshot record to the index. An empty snapshot is skipped.
pub async fn run_publish(
    storage: &dyn SnapshotStorage,
    publisher: &dyn IndexPublisher,
) -> Result<PublishSummary> {
    let records = storage.load_records().await?;
    if records.is_empty() {
        log::warn!("Snapshot is empty, nothing to publish");
        return Ok(PublishSummary::default());
    }

    log::info!("Publishing {} records", records.len());
    let summary = publisher.publish(&records).await?;
    log::info!(
        "Published {} records in {} batches",
        summary.records,
        summary.batches
    );
    Ok(summary)
}
