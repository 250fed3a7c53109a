//! Tests for the explorer session
//!
//! Each test builds a data directory with a raw dataset and, where needed,
//! the derived summaries produced by the aggregation job.


use crate::aggregation::AggregationJob;
use crate::config::ExplorerConfig;
use crate::explorer::Explorer;
use crate::testing::{config_with_raw, sample_trips};
use tempfile::TempDir;

/// Data directory with raw trips and all three summaries
pub fn aggregated_session(temp_dir: &TempDir) -> Explorer {
    let config = config_with_raw(temp_dir.path(), &mut sample_trips());
    AggregationJob::new(config.clone())
        .without_progress()
        .run()
        .unwrap();
    Explorer::new(config)
}

/// Data directory with raw trips only
pub fn raw_only_session(temp_dir: &TempDir) -> Explorer {
    Explorer::new(config_with_raw(temp_dir.path(), &mut sample_trips()))
}

pub fn empty_session(temp_dir: &TempDir) -> Explorer {
    Explorer::new(ExplorerConfig::default().with_data_dir(temp_dir.path()))
}
