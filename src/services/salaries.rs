// src/services/salaries.rs

//! Salary table fetcher service.
//!
//! Fetches airline pages concurrently and extracts the captain pay block.
//! Every airline yields a [`FetchOutcome`]; errors never escape a single
//! fetch, so one broken page cannot abort the batch.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::AppError;
use crate::models::{AirlineLink, Config, FetchFailure, FetchOutcome, SalaryRow};
use crate::services::cache::TtlCache;
use crate::services::tables::{SalarySlice, read_tables};
use crate::utils::http;

/// Service for fetching salary tables from airline pages.
pub struct SalaryTableFetcher {
    config: Arc<Config>,
    client: Client,
    cache: TtlCache<AirlineLink, FetchOutcome>,
}

impl SalaryTableFetcher {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        let cache = TtlCache::from_config(&config.cache);
        Self {
            config,
            client,
            cache,
        }
    }

    /// Fetch every airline with bounded concurrency.
    ///
    /// Returns once all fetches have finished, in input order.
    pub async fn fetch_all(&self, links: &[AirlineLink]) -> Vec<FetchOutcome> {
        let concurrency = self.config.crawler.max_concurrent.max(1);

        let outcomes: Vec<FetchOutcome> = stream::iter(links)
            .map(|link| self.fetch(link))
            .buffered(concurrency)
            .collect()
            .await;

        let failures = outcomes.iter().filter(|o| !o.is_success()).count();
        log::info!(
            "Fetched {} airline pages ({} succeeded, {} failed)",
            outcomes.len(),
            outcomes.len() - failures,
            failures
        );
        outcomes
    }

    /// Fetch one airline page. Successful results are cached.
    pub async fn fetch(&self, link: &AirlineLink) -> FetchOutcome {
        if let Some(outcome) = self.cache.get(link) {
            log::debug!("Salary cache hit for {}", link.url);
            return outcome;
        }

        let outcome = self.fetch_uncached(link).await;
        match &outcome {
            FetchOutcome::Success(_) => {
                log::debug!("Fetched salary table for {}", link.name);
                self.cache.insert(link.clone(), outcome.clone());
            }
            FetchOutcome::Failure(failure) => {
                log::warn!("Failed to fetch salaries for {}: {}", link.url, failure.error);
            }
        }
        outcome
    }

    async fn fetch_uncached(&self, link: &AirlineLink) -> FetchOutcome {
        let html = match http::fetch_html(&self.client, &link.url).await {
            Ok(html) => html,
            Err(error) => return failure(link, error, None),
        };

        let tables = match read_tables(&html) {
            Ok(tables) => tables,
            Err(error) => return failure(link, error, None),
        };

        match SalarySlice::locate(&link.url, &tables, &self.config.source) {
            Ok(slice) => FetchOutcome::Success(SalaryRow {
                link: link.clone(),
                capt_max: slice.capt_max,
                capt_min: slice.capt_min,
                date_capt_max: slice.date_capt_max,
                date_capt_min: slice.date_capt_min,
            }),
            Err((error, partial)) => failure(link, error, partial.map(|t| t.rows.clone())),
        }
    }
}

fn failure(
    link: &AirlineLink,
    error: AppError,
    partial_table: Option<Vec<Vec<Option<String>>>>,
) -> FetchOutcome {
    FetchOutcome::Failure(FetchFailure {
        link: link.clone(),
        error: error.to_string(),
        partial_table,
    })
}
