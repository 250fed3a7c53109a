//! Taxi Explorer Library
//!
//! Fetches the NYC yellow taxi trip dataset for January 2022, precomputes
//! hourly, daily and payment-type summaries as Parquet artifacts, and serves
//! an interactive explorer over the raw and derived tables.
//!
//! This library provides tools for:
//! - Downloading the raw dataset once, atomically
//! - Aggregating trip counts and averages with per-summary failure isolation
//! - Filtering trips by pickup date and distance
//! - Running free-form SQL against the loaded tables

pub mod aggregation;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod explorer;
pub mod fetcher;
pub mod models;
pub mod render;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use aggregation::{AggregationJob, AggregationReport};
pub use config::{CompressionAlgorithm, ExplorerConfig};
pub use error::{ExplorerError, Result};
pub use explorer::{Explorer, TripFilter, ViewState};
pub use fetcher::{DatasetFetcher, FetchOutcome};
pub use models::SummaryKind;
