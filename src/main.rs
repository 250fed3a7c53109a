use clap::Parser;
use std::process;
use taxi_explorer::cli::{Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    eprintln!("Failed to listen for CTRL+C: {}", e);
                }
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(taxi_explorer::ExplorerError::Interrupted {
                    reason: "interrupted by user".to_string(),
                })
            }
        }
    });

    match result {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Taxi Explorer - NYC Yellow Taxi Trip Analytics");
    println!("==============================================");
    println!();
    println!("Aggregate and explore the NYC TLC yellow taxi trips for January 2022.");
    println!();
    println!("USAGE:");
    println!("    taxi-explorer <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    fetch       Download the raw dataset if it is not already present");
    println!("    aggregate   Recompute the hourly, daily and payment summaries");
    println!("    explore     Show the dashboard views in the terminal");
    println!("    query       Run one SQL query against the loaded tables");
    println!("    shell       Interactive SQL prompt");
    println!();
    println!("EXAMPLES:");
    println!("    taxi-explorer fetch && taxi-explorer aggregate");
    println!("    taxi-explorer explore --from 2022-01-10 --to 2022-01-16 --max-distance 10");
    println!("    taxi-explorer query \"SELECT * FROM hourly_summary ORDER BY trip_count DESC\"");
    println!();
    println!("For detailed help on any command, use:");
    println!("    taxi-explorer <COMMAND> --help");
}
