//! Parquet persistence for derived summaries
//!
//! A summary is written to a temporary file in the destination directory
//! and renamed over the target only once the write finished, so a failed
//! write never replaces the previous artifact with a partial one.

use crate::config::CompressionAlgorithm;
use crate::error::{ExplorerError, Result};
use crate::models::SummaryKind;

use polars::prelude::{DataFrame, ParquetWriter as PolarsParquetWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Writer that fully replaces one summary artifact per call
#[derive(Debug, Clone)]
pub struct SummaryWriter {
    compression: CompressionAlgorithm,
}

impl SummaryWriter {
    pub fn new(compression: CompressionAlgorithm) -> Self {
        Self { compression }
    }

    /// Persist `df` at `path`, replacing any prior content
    ///
    /// Returns the number of bytes written.
    pub fn write(&self, kind: SummaryKind, df: &mut DataFrame, path: &Path) -> Result<u64> {
        let dir = target_dir(path);
        std::fs::create_dir_all(&dir)?;

        let mut staged = NamedTempFile::new_in(&dir)?;
        let bytes = PolarsParquetWriter::new(staged.as_file_mut())
            .with_compression(self.compression.to_polars_compression())
            .finish(df)
            .map_err(|e| ExplorerError::aggregation(kind, format!("parquet write failed: {}", e)))?;

        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| ExplorerError::Io(e.error))?;

        debug!(
            "Wrote {} summary ({} rows, {} bytes) to {}",
            kind,
            df.height(),
            bytes,
            path.display()
        );
        Ok(bytes)
    }
}

fn target_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
