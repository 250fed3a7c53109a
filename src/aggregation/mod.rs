//! Aggregation job with per-summary isolation.
//!
//! Loads the raw trip table once, computes the hourly, daily and payment
//! summaries, and persists each as its own Parquet artifact. A summary that
//! fails is reported in the run's [`AggregationReport`] while the others are
//! still attempted.

pub mod summaries;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::summaries::{summary_plan, trip_statistics};
use self::writer::SummaryWriter;

use crate::config::ExplorerConfig;
use crate::constants::REPORT_SAMPLE_ROWS;
use crate::error::{ExplorerError, Result};
use crate::models::{AggregationStats, HourlyRow, SummaryKind, TripStatistics};

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// A summary that was computed and persisted
#[derive(Debug, Clone)]
pub struct SummaryArtifact {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: u64,
    /// Sum of the summary's count column
    pub total_count: i64,
}

/// Outcome of one summary within a run
#[derive(Debug)]
pub struct SummaryOutcome {
    pub kind: SummaryKind,
    pub result: Result<SummaryArtifact>,
}

impl SummaryOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything one aggregation run produced
#[derive(Debug)]
pub struct AggregationReport {
    pub statistics: TripStatistics,
    pub sample: DataFrame,
    pub hourly_distribution: Vec<HourlyRow>,
    pub outcomes: Vec<SummaryOutcome>,
    pub stats: AggregationStats,
}

impl AggregationReport {
    pub fn outcome(&self, kind: SummaryKind) -> Option<&SummaryOutcome> {
        self.outcomes.iter().find(|o| o.kind == kind)
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(SummaryOutcome::is_ok)
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| !o.is_ok())
    }

    /// Summaries whose counts do not add up to the raw row count
    pub fn verify_counts(&self) -> Vec<SummaryKind> {
        let expected = self.statistics.row_count as i64;
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                Ok(artifact) if artifact.total_count != expected => Some(outcome.kind),
                _ => None,
            })
            .collect()
    }
}

/// Job that recomputes every derived summary from the raw dataset
#[derive(Debug)]
pub struct AggregationJob {
    config: ExplorerConfig,
    writer: SummaryWriter,
    show_progress: bool,
}

impl AggregationJob {
    pub fn new(config: ExplorerConfig) -> Self {
        let writer = SummaryWriter::new(config.compression);
        Self {
            config,
            writer,
            show_progress: true,
        }
    }

    /// Suppress the terminal spinner
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Run the job end to end
    ///
    /// Fails with `MissingInput` before writing anything when the raw file is
    /// absent. Per-summary failures are carried in the report.
    pub fn run(&self) -> Result<AggregationReport> {
        let start_time = Instant::now();
        let raw_path = self.config.raw_path();

        if !raw_path.exists() {
            return Err(ExplorerError::MissingInput { path: raw_path });
        }

        info!("Analyzing trip data from {}", raw_path.display());
        let trips = load_trips(&raw_path)?;

        let statistics = trip_statistics(&trips)?;
        let sample = trips.clone().limit(REPORT_SAMPLE_ROWS as IdxSize).collect()?;
        info!("Loaded {} trip records", statistics.row_count);

        let spinner = self.spinner();
        let mut outcomes = Vec::with_capacity(SummaryKind::ALL.len());
        let mut hourly_distribution = Vec::new();

        for kind in SummaryKind::ALL {
            spinner.set_message(format!("Computing {} summary...", kind));
            let result = self.build_summary(kind, trips.clone());

            let result = result.map(|(artifact, df)| {
                if kind == SummaryKind::Hourly {
                    match HourlyRow::from_frame(&df) {
                        Ok(rows) => hourly_distribution = rows,
                        Err(e) => error!("Could not read back hourly distribution: {}", e),
                    }
                }
                artifact
            });

            match &result {
                Ok(artifact) => debug!(
                    "{} summary: {} rows -> {}",
                    kind,
                    artifact.rows,
                    artifact.path.display()
                ),
                Err(e) => error!("{}", e),
            }

            let result = match result {
                Err(e) if e.is_fatal() => {
                    spinner.abandon_with_message("Aggregation aborted");
                    return Err(e);
                }
                other => other,
            };

            outcomes.push(SummaryOutcome { kind, result });
            spinner.inc(1);
        }

        spinner.finish_with_message("Analysis complete");

        let summaries_written = outcomes.iter().filter(|o| o.is_ok()).count();
        let stats = AggregationStats {
            summaries_written,
            summaries_failed: outcomes.len() - summaries_written,
            raw_rows: statistics.row_count,
            output_dir: self.config.data_dir().to_path_buf(),
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        Ok(AggregationReport {
            statistics,
            sample,
            hourly_distribution,
            outcomes,
            stats,
        })
    }

    /// Compute one summary in memory, then persist it
    fn build_summary(
        &self,
        kind: SummaryKind,
        trips: LazyFrame,
    ) -> Result<(SummaryArtifact, DataFrame)> {
        let mut df = summary_plan(kind, trips)
            .collect()
            .map_err(|e| ExplorerError::aggregation(kind, e))?;

        let total_count = df
            .column(kind.count_column())
            .and_then(|c| c.as_materialized_series().sum::<i64>())
            .map_err(|e| ExplorerError::aggregation(kind, e))?;

        let path = self.config.summary_path(kind);
        let bytes = self.writer.write(kind, &mut df, &path)?;

        Ok((
            SummaryArtifact {
                path,
                rows: df.height(),
                bytes,
                total_count,
            },
            df,
        ))
    }

    fn spinner(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(SummaryKind::ALL.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{pos}/{len}] {msg}")
        {
            pb.set_style(style);
        }
        pb
    }
}

/// Read the raw trip table fully into memory and hand it out as a lazy frame
pub fn load_trips(path: &Path) -> Result<LazyFrame> {
    if !path.exists() {
        return Err(ExplorerError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;
    Ok(df.lazy())
}
