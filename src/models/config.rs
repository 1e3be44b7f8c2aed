//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Directory page listing every airline.
pub const DEFAULT_BASE_URL: &str = "https://www.pilotjobsnetwork.com/";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetching behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Where airlines and their salary tables are found
    #[serde(default)]
    pub source: SourceConfig,

    /// Time-boxed fetch cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Search index publishing
    #[serde(default)]
    pub index: IndexConfig,

    /// Snapshot file names, relative to the storage directory
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.source.base_url.trim().is_empty() {
            return Err(AppError::validation("source.base_url is empty"));
        }
        url::Url::parse(&self.source.base_url)?;
        if self.source.link_filter.is_empty() {
            return Err(AppError::validation("source.link_filter is empty"));
        }
        if self.source.salary_column == self.source.date_column {
            return Err(AppError::validation(
                "source.salary_column and source.date_column must differ",
            ));
        }
        if self.cache.capacity == 0 {
            return Err(AppError::validation("cache.capacity must be > 0"));
        }
        if self.index.name.trim().is_empty() {
            return Err(AppError::validation("index.name is empty"));
        }
        if self.index.batch_size == 0 {
            return Err(AppError::validation("index.batch_size must be > 0"));
        }
        if self.paths.snapshot_file == self.paths.raw_file {
            return Err(AppError::validation(
                "paths.snapshot_file and paths.raw_file must differ",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent airline page fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Layout assumptions about the scraped site.
///
/// The salary block is the fourth table on every airline page, with the
/// captain maximum and minimum pay on body rows 2 and 3. Salary values sit in
/// column 1 and their "last updated" dates in column 2. Nothing on the page
/// names these cells, so the positions are the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory page listing airlines
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Substring an anchor `href` must contain to be an airline page
    #[serde(default = "defaults::link_filter")]
    pub link_filter: String,

    /// Zero-based index of the salary table among all page tables
    #[serde(default = "defaults::table_index")]
    pub table_index: usize,

    /// Zero-based body row holding captain maximum pay; minimum pay follows
    #[serde(default = "defaults::first_row")]
    pub first_row: usize,

    /// Column holding salary values
    #[serde(default = "defaults::salary_column")]
    pub salary_column: usize,

    /// Column holding "last updated" dates
    #[serde(default = "defaults::date_column")]
    pub date_column: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            link_filter: defaults::link_filter(),
            table_index: defaults::table_index(),
            first_row: defaults::first_row(),
            salary_column: defaults::salary_column(),
            date_column: defaults::date_column(),
        }
    }
}

/// Fetch cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds
    #[serde(default = "defaults::cache_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of entries per cache
    #[serde(default = "defaults::cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::cache_ttl(),
            capacity: defaults::cache_capacity(),
        }
    }
}

/// How records get their index object id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectIdPolicy {
    /// Let the index assign an id to every record
    #[default]
    Auto,
    /// Derive the id from `(URL, Top/Base)` so re-publishing upserts
    Fingerprint,
}

/// Search index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index name
    #[serde(default = "defaults::index_name")]
    pub name: String,

    /// Environment variable holding the application id
    #[serde(default = "defaults::app_id_env")]
    pub app_id_env: String,

    /// Environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub object_ids: ObjectIdPolicy,

    /// Records per batch request
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Override for the API host (defaults to `https://{app_id}.algolia.net`)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: defaults::index_name(),
            app_id_env: defaults::app_id_env(),
            api_key_env: defaults::api_key_env(),
            object_ids: ObjectIdPolicy::default(),
            batch_size: defaults::batch_size(),
            endpoint: None,
        }
    }
}

/// Output file names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Final record snapshot
    #[serde(default = "defaults::snapshot_file")]
    pub snapshot_file: String,

    /// Raw per-airline fetch outcomes, one per known airline
    #[serde(default = "defaults::raw_file")]
    pub raw_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            snapshot_file: defaults::snapshot_file(),
            raw_file: defaults::raw_file(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; pilot-salaries/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        8
    }

    // Source defaults
    pub fn base_url() -> String {
        super::DEFAULT_BASE_URL.into()
    }
    pub fn link_filter() -> String {
        "jobs/".into()
    }
    pub fn table_index() -> usize {
        3
    }
    pub fn first_row() -> usize {
        2
    }
    pub fn salary_column() -> usize {
        1
    }
    pub fn date_column() -> usize {
        2
    }

    // Cache defaults
    pub fn cache_ttl() -> u64 {
        86_400
    }
    pub fn cache_capacity() -> usize {
        128
    }

    // Index defaults
    pub fn index_name() -> String {
        "squawkit_scraping".into()
    }
    pub fn app_id_env() -> String {
        "ALGOLIA_APPLICATION_ID".into()
    }
    pub fn api_key_env() -> String {
        "ALGOLIA_API_KEY".into()
    }
    pub fn batch_size() -> usize {
        1000
    }

    // Path defaults
    pub fn snapshot_file() -> String {
        "jobs.json".into()
    }
    pub fn raw_file() -> String {
        "data.json".into()
    }
}
