// src/services/publisher.rs

//! Search index publishing.
//!
//! Records are pushed through the Algolia batch API. Depending on
//! [`ObjectIdPolicy`] the service either assigns object ids itself or the
//! record's `(URL, Top/Base)` fingerprint is used, making re-publishing an
//! upsert.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::{IndexConfig, ObjectIdPolicy, SalaryRecord};

/// What a publish call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub records: usize,
    pub batches: usize,
    /// Ids the index reported for the published objects
    pub object_ids: Vec<String>,
}

/// Sink accepting the final dataset.
#[async_trait]
pub trait IndexPublisher: Send + Sync {
    async fn publish(&self, records: &[SalaryRecord]) -> Result<PublishSummary>;
}

/// Stable object id for a record: hex SHA-256 of `URL` and `Top/Base`.
pub fn fingerprint(record: &SalaryRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.url.as_bytes());
    hasher.update(b"\n");
    hasher.update(record.tier.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default, rename = "objectIDs")]
    object_ids: Vec<String>,
}

/// Algolia index client.
pub struct AlgoliaPublisher {
    client: Client,
    endpoint: String,
    index: String,
    app_id: String,
    api_key: String,
    object_ids: ObjectIdPolicy,
    batch_size: usize,
}

impl AlgoliaPublisher {
    pub fn new(
        client: Client,
        config: &IndexConfig,
        app_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let app_id = app_id.into();
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.algolia.net", app_id));

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            index: config.name.clone(),
            app_id,
            api_key: api_key.into(),
            object_ids: config.object_ids,
            batch_size: config.batch_size.max(1),
        }
    }

    /// Build a publisher with credentials read from the environment.
    pub fn from_env(client: Client, config: &IndexConfig) -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::config(format!("environment variable {name} is not set")))
        };
        let app_id = read(&config.app_id_env)?;
        let api_key = read(&config.api_key_env)?;
        Ok(Self::new(client, config, app_id, api_key))
    }

    fn batch_url(&self) -> String {
        format!("{}/1/indexes/{}/batch", self.endpoint, self.index)
    }

    fn request_for(&self, record: &SalaryRecord) -> Result<Value> {
        let mut body = serde_json::to_value(record)?;
        let action = match self.object_ids {
            ObjectIdPolicy::Auto => "addObject",
            ObjectIdPolicy::Fingerprint => {
                if let Value::Object(map) = &mut body {
                    map.insert("objectID".into(), Value::String(fingerprint(record)));
                }
                "updateObject"
            }
        };
        Ok(json!({ "action": action, "body": body }))
    }

    async fn send_batch(&self, records: &[SalaryRecord]) -> Result<Vec<String>> {
        let requests = records
            .iter()
            .map(|r| self.request_for(r))
            .collect::<Result<Vec<_>>>()?;

        let response = self
            .client
            .post(self.batch_url())
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key)
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .map_err(|e| AppError::publish(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::publish(format!(
                "index '{}' rejected batch: {} {}",
                self.index, status, body
            )));
        }

        let parsed: BatchResponse = response
            .json()
            .await
            .map_err(|e| AppError::publish(format!("unreadable batch response: {e}")))?;
        Ok(parsed.object_ids)
    }
}

#[async_trait]
impl IndexPublisher for AlgoliaPublisher {
    async fn publish(&self, records: &[SalaryRecord]) -> Result<PublishSummary> {
        let mut summary = PublishSummary {
            records: records.len(),
            ..PublishSummary::default()
        };

        for chunk in records.chunks(self.batch_size) {
            let ids = self.send_batch(chunk).await?;
            summary.batches += 1;
            summary.object_ids.extend(ids);
            log::debug!(
                "Published batch {} ({} records) to {}",
                summary.batches,
                chunk.len(),
                self.index
            );
        }

        Ok(summary)
    }
}
