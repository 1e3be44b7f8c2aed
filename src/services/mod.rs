//! Service layer for the salary scraper.
//!
//! This module contains the business logic for:
//! - Airline discovery (`AirlineDirectory`)
//! - Salary table fetching (`SalaryTableFetcher`)
//! - Search index publishing (`AlgoliaPublisher`)

pub mod cache;
mod links;
mod publisher;
mod salaries;
pub mod tables;

pub use cache::TtlCache;
pub use links::{AirlineDirectory, Discovery, extract_links};
pub use publisher::{AlgoliaPublisher, IndexPublisher, PublishSummary, fingerprint};
pub use salaries::SalaryTableFetcher;
