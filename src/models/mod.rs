// src/models/mod.rs

//! Domain models for the salary scraper.

mod airline;
mod config;
mod salary;

// Re-export all public types
pub use airline::{AirlineIdentity, AirlineLink, DirectoryLink, LABEL_SEPARATOR};
pub use config::{
    CacheConfig, Config, CrawlerConfig, DEFAULT_BASE_URL, IndexConfig, ObjectIdPolicy,
    PathsConfig, SourceConfig,
};
pub use salary::{FetchFailure, FetchOutcome, NAN, PayTier, SalaryRecord, SalaryRow};
