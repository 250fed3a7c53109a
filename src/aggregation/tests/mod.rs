//! Tests for the aggregation job
//!
//! Runs the complete job against small Parquet datasets in temporary
//! data directories.

pub mod job_runs;
