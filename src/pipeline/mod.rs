//! Pipeline entry points for scraper operations.
//!
//! - `run_scrape`: Discover airlines, fetch changed ones, merge into the snapshot
//! - `run_rebuild`: Reshape stored raw outcomes into a fresh snapshot
//! - `run_publish`: Push the snapshot to the search index

pub mod merge;
pub mod publish;
pub mod reshape;
pub mod scrape;

pub use merge::{MergeResult, RunState, airlines_to_scrape, merge_outcomes, union};
pub use publish::run_publish;
pub use reshape::reshape;
pub use scrape::{ScrapeSummary, run_rebuild, run_scrape};
