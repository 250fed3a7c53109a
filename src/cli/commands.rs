//! Command implementations for the taxi explorer CLI
//!
//! Every command returns the process exit code. Failures that the user can
//! act on (missing dataset, every summary failing) map to a non-zero code;
//! other errors propagate to `main`.

use crate::aggregation::AggregationJob;
use crate::cli::{Args, Commands, ExploreArgs, ViewSelection};
use crate::config::ExplorerConfig;
use crate::constants::{DEFAULT_QUERY, tables};
use crate::error::{ExplorerError, Result};
use crate::explorer::Explorer;
use crate::fetcher::DatasetFetcher;
use crate::render;

use colored::*;
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Main command runner
pub async fn run(args: Args) -> Result<i32> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let config = args.to_config()?;
    debug!("Loaded configuration: {:?}", config);

    let Some(command) = args.command.clone() else {
        return Ok(EXIT_SUCCESS);
    };

    match command {
        Commands::Fetch => run_fetch(&config, args.show_progress()).await,
        Commands::Aggregate => run_aggregate(config, args.show_progress()).await,
        Commands::Explore(explore) => blocking(move || run_explore(config, &explore)).await,
        Commands::Query { sql } => blocking(move || run_query(config, &sql)).await,
        Commands::Shell => blocking(move || run_shell(config)).await,
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taxi_explorer={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| ExplorerError::Configuration {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Run synchronous engine work off the async runtime
async fn blocking<F>(work: F) -> Result<i32>
where
    F: FnOnce() -> Result<i32> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ExplorerError::Interrupted {
            reason: format!("worker task failed: {}", e),
        })?
}

async fn run_fetch(config: &ExplorerConfig, show_progress: bool) -> Result<i32> {
    let mut fetcher = DatasetFetcher::new(&config.source_url, config.raw_path());
    if !show_progress {
        fetcher = fetcher.without_progress();
    }

    let outcome = fetcher.fetch().await?;
    render::print_fetch_outcome(&outcome);
    Ok(EXIT_SUCCESS)
}

async fn run_aggregate(config: ExplorerConfig, show_progress: bool) -> Result<i32> {
    let mut job = AggregationJob::new(config);
    if !show_progress {
        job = job.without_progress();
    }

    let report = match tokio::task::spawn_blocking(move || job.run()).await {
        Ok(Ok(report)) => report,
        Ok(Err(ExplorerError::MissingInput { path })) => {
            error!("Raw dataset not found at {}", path.display());
            eprintln!(
                "{} {} not found. Run `taxi-explorer fetch` first.",
                "Error:".red().bold(),
                path.display()
            );
            return Ok(EXIT_FAILURE);
        }
        Ok(Err(e)) => return Err(e),
        Err(e) => {
            return Err(ExplorerError::Interrupted {
                reason: format!("aggregation task failed: {}", e),
            });
        }
    };

    render::print_aggregation_report(&report);

    if report.all_failed() {
        error!("Every summary failed; no artifacts were written");
        return Ok(EXIT_FAILURE);
    }
    if !report.all_succeeded() {
        warn!(
            "{} of {} summaries failed",
            report.stats.summaries_failed,
            report.outcomes.len()
        );
    }

    info!(
        "Aggregation finished in {} ms",
        report.stats.processing_time_ms
    );
    Ok(EXIT_SUCCESS)
}

fn run_explore(config: ExplorerConfig, explore: &ExploreArgs) -> Result<i32> {
    let mut explorer = Explorer::new(config);

    let bounds = explorer.filter_bounds()?;
    if let Some(bounds) = &bounds {
        if let Some(dates) = bounds.date {
            debug!("Data spans {} to {}", dates.start, dates.end);
        }
    }

    let filter = explore.to_filter(bounds.as_ref());
    debug!("Active filter: {:?}", filter);

    if explore.view.includes(ViewSelection::Overview) {
        render::print_overview(&explorer.overview(&filter)?);
    }
    if explore.view.includes(ViewSelection::Hourly) {
        render::print_hourly(&explorer.hourly()?);
    }
    if explore.view.includes(ViewSelection::Daily) {
        render::print_daily(&explorer.daily()?);
    }
    if explore.view.includes(ViewSelection::Payment) {
        render::print_payment(&explorer.payment()?);
    }

    Ok(EXIT_SUCCESS)
}

fn run_query(config: ExplorerConfig, sql: &str) -> Result<i32> {
    let mut explorer = Explorer::new(config);
    match explorer.query(sql) {
        Ok(df) => {
            render::print_frame(&df);
            Ok(EXIT_SUCCESS)
        }
        Err(ExplorerError::Query { message }) => {
            render::print_query_error(&message);
            Ok(EXIT_FAILURE)
        }
        Err(e) => Err(e),
    }
}

/// Read queries from stdin until `\q`, `exit` or end of input
fn run_shell(config: ExplorerConfig) -> Result<i32> {
    let mut explorer = Explorer::new(config);
    let loaded = explorer.catalog()?.loaded_tables();

    println!("{}", "Taxi Explorer SQL shell".bright_green().bold());
    if loaded.is_empty() {
        println!(
            "{}",
            "No tables loaded. Run `taxi-explorer fetch` and `taxi-explorer aggregate` first."
                .yellow()
        );
    } else {
        println!("Tables: {}", loaded.join(", ").bright_cyan());
    }
    println!("Example: {}", DEFAULT_QUERY.replace('\n', " ").bright_black());
    println!("Type \\q or exit to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", "sql>".bright_white().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let input = line.trim();

        match input {
            "" => continue,
            "\\q" | "exit" | "quit" => break,
            "\\d" | "tables" => {
                for table in tables::ALL {
                    let status = if explorer.catalog()?.is_loaded(table) {
                        "loaded".green()
                    } else {
                        "no data".yellow()
                    };
                    println!("   {:<16} {}", table, status);
                }
            }
            sql => match explorer.query(sql) {
                Ok(df) => render::print_frame(&df),
                Err(ExplorerError::Query { message }) => render::print_query_error(&message),
                Err(e) => return Err(e),
            },
        }
    }

    Ok(EXIT_SUCCESS)
}
