//! Terminal rendering for reports and dashboard views

use crate::aggregation::AggregationReport;
use crate::explorer::views::NOT_RECORDED;
use crate::explorer::{DailyView, HourlyView, Overview, PaymentView, ViewState};
use crate::fetcher::FetchOutcome;
use crate::models::{HourlyRow, TripStatistics};

use colored::*;
use polars::prelude::DataFrame;
use std::time::Duration;

const BAR_WIDTH: usize = 40;

/// Format a byte count in human-readable units
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Horizontal bar scaled against `max`
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

fn print_heading(title: &str) {
    println!();
    println!("{}", title.bright_green().bold());
    println!("{}", "━".repeat(title.chars().count().max(20)).bright_black());
}

fn print_metric(label: &str, value: String) {
    println!("   • {:<22} {}", label, value.bright_white().bold());
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("${:.2}", v))
}

fn miles(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2} mi", v))
}

fn print_unavailable<T>(state: &ViewState<T>) {
    match state {
        ViewState::NoData { message } => println!("   {}", message.yellow()),
        ViewState::Error { message } => println!("   {}", message.red()),
        ViewState::Loaded(_) | ViewState::Filtered(_) => {}
    }
}

fn hour_label(hour: Option<i32>) -> String {
    hour.map_or_else(|| NOT_RECORDED.to_string(), |h| format!("{:02}:00", h))
}

fn day_label(day: Option<i32>) -> String {
    day.map_or_else(|| NOT_RECORDED.to_string(), |d| format!("Day {:>2}", d))
}

pub fn print_fetch_outcome(outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::AlreadyPresent(path) => println!(
            "{} {}",
            "File already exists:".bright_cyan(),
            path.display()
        ),
        FetchOutcome::Downloaded { path, bytes } => println!(
            "{} {} ({})",
            "Downloaded".bright_green().bold(),
            path.display(),
            format_size(*bytes)
        ),
    }
}

fn print_trip_statistics(statistics: &TripStatistics) {
    print_heading("Dataset Overview");
    print_metric("Total records", statistics.row_count.to_string());
    print_metric("Average distance", miles(statistics.avg_distance));
    if statistics.avg_fare.is_some() {
        print_metric("Average fare", money(statistics.avg_fare));
    }
    if statistics.avg_tip.is_some() {
        print_metric("Average tip", money(statistics.avg_tip));
    }
    print_metric("Average total", money(statistics.avg_total));
}

fn print_hourly_bars(rows: &[HourlyRow]) {
    let max = rows.iter().map(|r| r.trip_count).max().unwrap_or(0) as f64;
    for row in rows {
        println!(
            "   {:<12} {:>9} {}",
            hour_label(row.hour),
            row.trip_count,
            bar(row.trip_count as f64, max, BAR_WIDTH).cyan()
        );
    }
}

/// Dataset report and per-summary outcomes of an aggregation run
pub fn print_aggregation_report(report: &AggregationReport) {
    print_trip_statistics(&report.statistics);

    print_heading("Sample Records");
    print_frame(&report.sample);

    if !report.hourly_distribution.is_empty() {
        print_heading("Trips by Hour");
        print_hourly_bars(&report.hourly_distribution);
    }

    print_heading("Summaries");
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(artifact) => println!(
                "   {} {:<8} {} rows -> {} ({})",
                "✓".green().bold(),
                outcome.kind.to_string(),
                artifact.rows,
                artifact.path.display(),
                format_size(artifact.bytes)
            ),
            Err(e) => println!(
                "   {} {:<8} {}",
                "✗".red().bold(),
                outcome.kind.to_string(),
                e.to_string().red()
            ),
        }
    }

    for kind in report.verify_counts() {
        println!(
            "   {} {} counts do not add up to {} records",
            "⚠".yellow().bold(),
            kind,
            report.statistics.row_count
        );
    }

    let elapsed = Duration::from_millis(report.stats.processing_time_ms as u64);
    println!();
    println!(
        "{} {} of {} summaries written in {:.2}s",
        "Aggregation complete:".bright_green().bold(),
        report.stats.summaries_written,
        report.outcomes.len(),
        elapsed.as_secs_f64()
    );
}

pub fn print_overview(state: &ViewState<Overview>) {
    print_heading("Data Overview");
    let Some(overview) = state.data() else {
        print_unavailable(state);
        return;
    };
    if matches!(state, ViewState::Filtered(_)) {
        println!("   {}", "(filtered)".bright_black());
    }

    print_metric("Total trips", overview.row_count.to_string());
    print_metric("Average distance", miles(overview.avg_distance));
    print_metric("Average fare", money(overview.avg_amount));
    print_metric("Total revenue", money(Some(overview.total_amount)));

    println!();
    print_frame(&overview.preview);
}

pub fn print_hourly(state: &ViewState<HourlyView>) {
    print_heading("Hourly Patterns");
    let Some(view) = state.data() else {
        print_unavailable(state);
        return;
    };

    print_hourly_bars(&view.rows);
    if let Some(busiest) = &view.busiest_hour {
        println!();
        println!(
            "   Busiest hour: {} with {} trips",
            hour_label(busiest.hour).bright_yellow().bold(),
            busiest.trip_count
        );
    }
}

pub fn print_daily(state: &ViewState<DailyView>) {
    print_heading("Daily Patterns");
    let Some(view) = state.data() else {
        print_unavailable(state);
        return;
    };

    let max = view.rows.iter().map(|r| r.trip_count).max().unwrap_or(0) as f64;
    for row in &view.rows {
        println!(
            "   {:<12} {:>9} {:>10} {}",
            day_label(row.day),
            row.trip_count,
            money(row.avg_amount),
            bar(row.trip_count as f64, max, BAR_WIDTH).cyan()
        );
    }

    if let Some(peak) = &view.peak_day {
        println!();
        println!(
            "   Peak day: {} with {} trips",
            day_label(peak.day).bright_yellow().bold(),
            peak.trip_count
        );
    }
}

pub fn print_payment(state: &ViewState<PaymentView>) {
    print_heading("Payment Analysis");
    let Some(view) = state.data() else {
        print_unavailable(state);
        return;
    };

    let total: i64 = view.rows.iter().map(|e| e.row.count).sum();
    for entry in &view.rows {
        let share = if total > 0 {
            entry.row.count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "   {:<14} {:>9} {:>6.1}% {:>10} {}",
            entry.label,
            entry.row.count,
            share,
            money(entry.row.avg_amount),
            bar(entry.row.count as f64, total as f64, BAR_WIDTH).magenta()
        );
    }

    println!();
    if let Some(label) = &view.most_common {
        println!("   Most common payment: {}", label.bright_yellow().bold());
    }
    if let Some(label) = &view.highest_average {
        println!("   Highest average fare: {}", label.bright_yellow().bold());
    }
}

pub fn print_frame(df: &DataFrame) {
    println!("{}", df);
}

pub fn print_query_error(message: &str) {
    eprintln!("{} {}", "Query error:".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_null_keys_are_labelled() {
        assert_eq!(hour_label(Some(7)), "07:00");
        assert_eq!(hour_label(None), "Not recorded");
        assert_eq!(day_label(Some(3)), "Day  3");
        assert_eq!(day_label(None), "Not recorded");
    }

    #[test]
    fn test_bar_scales_to_width() {
        assert_eq!(bar(10.0, 10.0, 40).chars().count(), 40);
        assert_eq!(bar(5.0, 10.0, 40).chars().count(), 20);
        // Any non-zero value stays visible
        assert_eq!(bar(1.0, 1000.0, 40).chars().count(), 1);
        assert!(bar(0.0, 10.0, 40).is_empty());
        assert!(bar(3.0, 0.0, 40).is_empty());
    }
}
