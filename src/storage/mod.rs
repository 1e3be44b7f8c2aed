//! Storage abstractions for salary snapshots.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Scraper configuration
//! ├── jobs.json             # Snapshot: published salary records
//! └── data.json             # Raw fetch outcomes per airline
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{FetchOutcome, SalaryRecord};

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of items written
    pub count: usize,
    /// Where they were written
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Load the record snapshot; a missing snapshot is an empty dataset.
    async fn load_records(&self) -> Result<Vec<SalaryRecord>>;

    /// Replace the record snapshot atomically.
    async fn save_records(&self, records: &[SalaryRecord]) -> Result<WriteMetadata>;

    /// Load stored raw fetch outcomes; missing is empty.
    async fn load_raw(&self) -> Result<Vec<FetchOutcome>>;

    /// Replace the raw fetch outcomes atomically.
    async fn save_raw(&self, outcomes: &[FetchOutcome]) -> Result<WriteMetadata>;
}
