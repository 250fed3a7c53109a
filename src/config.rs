//! Configuration management and validation.
//!
//! Provides the explorer configuration: where the raw and derived files
//! live, where the raw dataset is downloaded from, and how derived files
//! are compressed.

use crate::constants::{
    DAILY_FILE_NAME, DEFAULT_DATA_DIR, DEFAULT_SOURCE_URL, HOURLY_FILE_NAME, MAX_PREVIEW_ROWS,
    PAYMENT_FILE_NAME, RAW_FILE_NAME,
};
use crate::error::{ExplorerError, Result};
use crate::models::SummaryKind;
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported compression algorithms for derived parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(ExplorerError::Configuration {
                message: format!(
                    "Unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }
}

/// Global configuration for aggregation and exploration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Directory holding the raw and derived files
    pub data_dir: PathBuf,

    /// Raw trip dataset file name within `data_dir`
    pub raw_file: String,

    /// Hourly summary file name within `data_dir`
    pub hourly_file: String,

    /// Daily summary file name within `data_dir`
    pub daily_file: String,

    /// Payment summary file name within `data_dir`
    pub payment_file: String,

    /// Remote location of the raw dataset
    pub source_url: String,

    /// Rows in the overview preview sample (capped at 10)
    pub preview_rows: usize,

    /// Compression for derived summary files
    pub compression: CompressionAlgorithm,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            raw_file: RAW_FILE_NAME.to_string(),
            hourly_file: HOURLY_FILE_NAME.to_string(),
            daily_file: DAILY_FILE_NAME.to_string(),
            payment_file: PAYMENT_FILE_NAME.to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            preview_rows: MAX_PREVIEW_ROWS,
            compression: CompressionAlgorithm::Snappy,
        }
    }
}

impl ExplorerConfig {
    /// Create configuration rooted at a custom data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Set the remote dataset location
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Set the preview sample size
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join(&self.raw_file)
    }

    /// Path of the persisted artifact for one summary
    pub fn summary_path(&self, kind: SummaryKind) -> PathBuf {
        let file = match kind {
            SummaryKind::Hourly => &self.hourly_file,
            SummaryKind::Daily => &self.daily_file,
            SummaryKind::Payment => &self.payment_file,
        };
        self.data_dir.join(file)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Effective preview limit after applying the hard cap
    pub fn preview_limit(&self) -> usize {
        self.preview_rows.min(MAX_PREVIEW_ROWS)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(ExplorerError::Configuration {
                message: "Source URL must not be empty".to_string(),
            });
        }

        if self.preview_rows == 0 || self.preview_rows > 10_000 {
            return Err(ExplorerError::Configuration {
                message: format!(
                    "preview_rows must be between 1 and 10000, got {}",
                    self.preview_rows
                ),
            });
        }

        let files = [
            &self.raw_file,
            &self.hourly_file,
            &self.daily_file,
            &self.payment_file,
        ];
        if files.iter().any(|f| f.trim().is_empty()) {
            return Err(ExplorerError::Configuration {
                message: "File names must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = ExplorerConfig::default();
        assert_eq!(config.raw_path(), PathBuf::from("data/yellow_taxi_2022_01.parquet"));
        assert_eq!(
            config.summary_path(SummaryKind::Payment),
            PathBuf::from("data/payment_types.parquet")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders_and_preview_cap() {
        let config = ExplorerConfig::default()
            .with_data_dir("/tmp/trips")
            .with_preview_rows(50)
            .with_compression(CompressionAlgorithm::Zstd);

        assert_eq!(
            config.summary_path(SummaryKind::Hourly),
            PathBuf::from("/tmp/trips/hourly_trips.parquet")
        );
        assert_eq!(config.preview_limit(), 10);
        assert_eq!(config.compression, CompressionAlgorithm::Zstd);
    }

    #[test]
    fn test_validation_failures() {
        let config = ExplorerConfig::default().with_source_url("  ");
        assert!(matches!(
            config.validate(),
            Err(ExplorerError::Configuration { .. })
        ));

        let config = ExplorerConfig::default().with_preview_rows(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compression_parsing() {
        assert_eq!(
            "ZSTD".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Zstd
        );
        assert_eq!(
            "none".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Uncompressed
        );
        assert!("brotli".parse::<CompressionAlgorithm>().is_err());
    }
}
