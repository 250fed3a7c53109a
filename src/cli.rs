//! Command-line interface components.

pub mod commands;

use crate::config::{CompressionAlgorithm, ExplorerConfig};
use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_SOURCE_URL, MAX_PREVIEW_ROWS};
use crate::error::Result;
use crate::explorer::{FilterBounds, TripFilter};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the taxi trip explorer
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taxi-explorer",
    version,
    about = "Aggregate and explore NYC yellow taxi trips from January 2022",
    long_about = "Downloads the NYC TLC yellow taxi trip records for January 2022, precomputes \
                  hourly, daily and payment-type summaries as Parquet files, and explores the \
                  raw and summary tables from the terminal with filters and free-form SQL."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the raw dataset and the derived summaries
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Location of the raw trip dataset
    #[arg(long, global = true, value_name = "URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Parquet compression for summaries (snappy, zstd, lz4, none)
    #[arg(long, global = true, default_value = "snappy")]
    pub compression: String,

    /// Number of sample rows in previews (at most 10 are shown)
    #[arg(long, global = true, default_value_t = MAX_PREVIEW_ROWS)]
    pub preview_rows: usize,

    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Download the raw dataset if it is not already present
    Fetch,
    /// Recompute the hourly, daily and payment summaries
    Aggregate,
    /// Show the dashboard views in the terminal
    Explore(ExploreArgs),
    /// Run one SQL query against the loaded tables
    Query {
        /// Query text; tables are raw_trips, hourly_summary, daily_summary, payment_summary
        sql: String,
    },
    /// Interactive SQL prompt
    Shell,
}

#[derive(Debug, Clone, Parser)]
pub struct ExploreArgs {
    /// First pickup date to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last pickup date to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Shortest trip distance to include, in miles
    #[arg(long, value_name = "MILES")]
    pub min_distance: Option<f64>,

    /// Longest trip distance to include, in miles
    #[arg(long, value_name = "MILES")]
    pub max_distance: Option<f64>,

    /// Which view to show
    #[arg(long, value_enum, default_value = "all")]
    pub view: ViewSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewSelection {
    Overview,
    Hourly,
    Daily,
    Payment,
    All,
}

impl ViewSelection {
    pub fn includes(&self, other: ViewSelection) -> bool {
        *self == ViewSelection::All || *self == other
    }
}

impl Args {
    /// Get the logging level from verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Build and validate the runtime configuration
    pub fn to_config(&self) -> Result<ExplorerConfig> {
        let compression: CompressionAlgorithm = self.compression.parse()?;
        let config = ExplorerConfig::default()
            .with_data_dir(&self.data_dir)
            .with_source_url(&self.source_url)
            .with_preview_rows(self.preview_rows)
            .with_compression(compression);
        config.validate()?;
        Ok(config)
    }
}

impl ExploreArgs {
    /// Trip filter from the flags; an open end takes the dataset's bound
    pub fn to_filter(&self, bounds: Option<&FilterBounds>) -> TripFilter {
        let mut filter = TripFilter::none();

        if self.from.is_some() || self.to.is_some() {
            let extent = bounds.and_then(|b| b.date);
            let start = self.from.or(extent.map(|d| d.start));
            let end = self.to.or(extent.map(|d| d.end));
            if let (Some(start), Some(end)) = (start, end) {
                filter = filter.with_date_range(start, end);
            }
        }

        if self.min_distance.is_some() || self.max_distance.is_some() {
            let extent = bounds.and_then(|b| b.distance);
            let min = self.min_distance.or(extent.map(|d| d.min)).unwrap_or(0.0);
            let max = self
                .max_distance
                .or(extent.map(|d| d.max))
                .unwrap_or(f64::INFINITY);
            filter = filter.with_distance_range(min, max);
        }

        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::{DateRange, DistanceRange};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bounds() -> FilterBounds {
        FilterBounds {
            date: Some(DateRange::new(date("2022-01-01"), date("2022-01-31"))),
            distance: Some(DistanceRange::new(0.0, 40.0)),
        }
    }

    #[test]
    fn test_explore_flags_parse() {
        let args = Args::parse_from([
            "taxi-explorer",
            "explore",
            "--from",
            "2022-01-05",
            "--max-distance",
            "10",
            "--view",
            "hourly",
        ]);

        let Some(Commands::Explore(explore)) = args.command else {
            panic!("expected explore command");
        };
        assert_eq!(explore.from, Some(date("2022-01-05")));
        assert_eq!(explore.max_distance, Some(10.0));
        assert_eq!(explore.view, ViewSelection::Hourly);
    }

    #[test]
    fn test_no_flags_means_no_filter() {
        let args = Args::parse_from(["taxi-explorer", "explore"]);
        let Some(Commands::Explore(explore)) = args.command else {
            panic!("expected explore command");
        };
        assert!(!explore.to_filter(Some(&bounds())).is_active());
        assert!(explore.view.includes(ViewSelection::Payment));
    }

    #[test]
    fn test_open_ends_take_dataset_bounds() {
        let explore = ExploreArgs {
            from: Some(date("2022-01-10")),
            to: None,
            min_distance: None,
            max_distance: Some(5.0),
            view: ViewSelection::Overview,
        };

        let filter = explore.to_filter(Some(&bounds()));
        let dates = filter.date.unwrap();
        assert_eq!(dates.start, date("2022-01-10"));
        assert_eq!(dates.end, date("2022-01-31"));

        let distance = filter.distance.unwrap();
        assert_eq!(distance.min, 0.0);
        assert_eq!(distance.max, 5.0);
    }

    #[test]
    fn test_global_options_build_config() {
        let args = Args::parse_from([
            "taxi-explorer",
            "aggregate",
            "--data-dir",
            "/tmp/taxi",
            "--compression",
            "zstd",
        ]);
        let config = args.to_config().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/taxi"));
        assert_eq!(config.compression, CompressionAlgorithm::Zstd);
    }

    #[test]
    fn test_unknown_compression_is_rejected() {
        let args = Args::parse_from(["taxi-explorer", "fetch", "--compression", "gzip"]);
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_log_levels() {
        let args = Args::parse_from(["taxi-explorer", "-vv", "fetch"]);
        assert_eq!(args.get_log_level(), "trace");
        let args = Args::parse_from(["taxi-explorer", "--quiet", "fetch"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }
}
