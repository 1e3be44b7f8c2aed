//! Local filesystem storage implementation.
//!
//! Snapshots are plain JSON arrays. Every write goes to a temporary file
//! that is renamed over the target, so readers never see a partial file.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{FetchOutcome, PathsConfig, SalaryRecord};
use crate::storage::{SnapshotStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    paths: PathsConfig,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            paths: paths.clone(),
        }
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.path(&self.paths.snapshot_file)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<WriteMetadata> {
        self.write_json(key, items).await?;
        Ok(WriteMetadata {
            count: items.len(),
            location: self.path(key).display().to_string(),
            timestamp: Utc::now(),
        })
    }
}

#[async_trait]
impl SnapshotStorage for LocalStorage {
    async fn load_records(&self) -> Result<Vec<SalaryRecord>> {
        match self.read_json(&self.paths.snapshot_file).await? {
            Some(records) => Ok(records),
            None => {
                log::info!("No snapshot at {}", self.snapshot_path().display());
                Ok(Vec::new())
            }
        }
    }

    async fn save_records(&self, records: &[SalaryRecord]) -> Result<WriteMetadata> {
        self.write_list(&self.paths.snapshot_file, records).await
    }

    async fn load_raw(&self) -> Result<Vec<FetchOutcome>> {
        match self.read_json(&self.paths.raw_file).await? {
            Some(outcomes) => Ok(outcomes),
            None => {
                log::warn!("No raw fetch data at {}", self.path(&self.paths.raw_file).display());
                Ok(Vec::new())
            }
        }
    }

    async fn save_raw(&self, outcomes: &[FetchOutcome]) -> Result<WriteMetadata> {
        self.write_list(&self.paths.raw_file, outcomes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AirlineLink, PayTier, SalaryRow};
    use tempfile::TempDir;

    fn storage(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(tmp.path(), &PathsConfig::default())
    }

    fn record(salary: Option<&str>) -> SalaryRecord {
        SalaryRecord {
            url: "https://www.pilotjobsnetwork.com/jobs/acme".into(),
            last_date: "2024-01-01".into(),
            country: "France".into(),
            name: "Air Acme".into(),
            year: None,
            tier: PayTier::CaptMax,
            salary: salary.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!storage.path("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        assert!(storage.load_records().await.unwrap().is_empty());
        assert!(storage.load_raw().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_uses_sentinel() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let records = vec![record(Some("150000")), record(None)];

        let meta = storage.save_records(&records).await.unwrap();
        assert_eq!(meta.count, 2);
        assert!(meta.location.ends_with("jobs.json"));

        let raw = std::fs::read_to_string(tmp.path().join("jobs.json")).unwrap();
        assert!(raw.trim_start().starts_with('['));
        assert!(raw.contains(r#""Salary": "NAN""#));
        assert!(!raw.contains("null"));

        assert_eq!(storage.load_records().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_raw_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        let outcomes = vec![FetchOutcome::Success(SalaryRow {
            link: AirlineLink {
                label: "2024 - France - Air Acme".into(),
                url: "u".into(),
                last_date: "2024".into(),
                country: "France".into(),
                name: "Air Acme".into(),
            },
            capt_max: Some("1".into()),
            capt_min: None,
            date_capt_max: Some("2020-01-01".into()),
            date_capt_min: None,
        })];

        storage.save_raw(&outcomes).await.unwrap();
        assert_eq!(storage.load_raw().await.unwrap(), outcomes);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        std::fs::write(tmp.path().join("jobs.json"), "{not json").unwrap();

        assert!(matches!(
            storage.load_records().await,
            Err(AppError::Json(_))
        ));
    }
}
