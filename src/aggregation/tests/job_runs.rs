//! End-to-end aggregation runs

use crate::aggregation::AggregationJob;
use crate::models::{DailyRow, HourlyRow, PaymentRow, SummaryKind};
use crate::testing::{config_with_raw, sample_trips, trip_frame, trip_frame_with_gaps};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn read_parquet(path: &Path) -> DataFrame {
    ParquetReader::new(File::open(path).unwrap()).finish().unwrap()
}

#[test]
fn test_run_writes_all_three_summaries() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_with_raw(temp_dir.path(), &mut sample_trips());

    let report = AggregationJob::new(config.clone())
        .without_progress()
        .run()
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.stats.summaries_written, 3);
    assert_eq!(report.stats.summaries_failed, 0);
    assert_eq!(report.statistics.row_count, 10);
    assert_eq!(report.sample.height(), 5);

    for kind in SummaryKind::ALL {
        assert!(config.summary_path(kind).exists(), "{} missing", kind);
    }
}

#[test]
fn test_summary_counts_sum_to_row_count() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_with_raw(temp_dir.path(), &mut sample_trips());

    let report = AggregationJob::new(config.clone())
        .without_progress()
        .run()
        .unwrap();
    assert!(report.verify_counts().is_empty());

    let hourly = HourlyRow::from_frame(&read_parquet(&config.summary_path(SummaryKind::Hourly)))
        .unwrap();
    let daily =
        DailyRow::from_frame(&read_parquet(&config.summary_path(SummaryKind::Daily))).unwrap();
    let payment =
        PaymentRow::from_frame(&read_parquet(&config.summary_path(SummaryKind::Payment))).unwrap();

    assert_eq!(hourly.iter().map(|r| r.trip_count).sum::<i64>(), 10);
    assert_eq!(daily.iter().map(|r| r.trip_count).sum::<i64>(), 10);
    assert_eq!(payment.iter().map(|r| r.count).sum::<i64>(), 10);
}

#[test]
fn test_hourly_keys_are_unique_and_in_range() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_with_raw(temp_dir.path(), &mut sample_trips());
    AggregationJob::new(config.clone())
        .without_progress()
        .run()
        .unwrap();

    let hourly = HourlyRow::from_frame(&read_parquet(&config.summary_path(SummaryKind::Hourly)))
        .unwrap();
    let unique: HashSet<Option<i32>> = hourly.iter().map(|r| r.hour).collect();

    assert_eq!(unique.len(), hourly.len());
    assert!(hourly.iter().all(|r| r.hour.is_some_and(|h| (0..24).contains(&h))));
    assert!(hourly.windows(2).all(|w| w[0].hour < w[1].hour));
}

#[test]
fn test_rerun_is_value_identical() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_with_raw(temp_dir.path(), &mut sample_trips());
    let job = AggregationJob::new(config.clone()).without_progress();

    job.run().unwrap();
    let first: Vec<DataFrame> = SummaryKind::ALL
        .iter()
        .map(|kind| read_parquet(&config.summary_path(*kind)))
        .collect();

    job.run().unwrap();
    let second: Vec<DataFrame> = SummaryKind::ALL
        .iter()
        .map(|kind| read_parquet(&config.summary_path(*kind)))
        .collect();

    for (a, b) in first.iter().zip(second.iter()) {
        assert!(a.equals_missing(b));
    }
}

#[test]
fn test_rerun_overwrites_rather_than_appends() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_with_raw(temp_dir.path(), &mut sample_trips());
    let job = AggregationJob::new(config.clone()).without_progress();
    job.run().unwrap();

    // Replace the raw dataset with a single trip and aggregate again
    let mut smaller = trip_frame(&[("2022-01-15 06:00:00", 2.5, 12.0, 2)]);
    crate::testing::write_parquet(&mut smaller, &config.raw_path());
    let report = job.run().unwrap();

    assert_eq!(report.statistics.row_count, 1);
    let payment =
        PaymentRow::from_frame(&read_parquet(&config.summary_path(SummaryKind::Payment))).unwrap();
    assert_eq!(payment.len(), 1);
    assert_eq!(payment[0].payment_type, Some(2));
    assert_eq!(payment[0].count, 1);
}

#[test]
fn test_report_carries_hourly_distribution() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_with_raw(temp_dir.path(), &mut sample_trips());

    let report = AggregationJob::new(config).without_progress().run().unwrap();

    assert_eq!(report.hourly_distribution.len(), 6);
    assert_eq!(report.hourly_distribution[0].hour, Some(0));
}

#[test]
fn test_missing_pickup_forms_its_own_group() {
    let temp_dir = TempDir::new().unwrap();
    let mut df = trip_frame_with_gaps(&[
        (Some("2022-01-04 05:00:00"), 1.0, 8.0, 1),
        (Some("2022-01-04 00:10:00"), 2.0, 11.0, 1),
        (None, 3.0, 14.0, 2),
    ]);
    let config = config_with_raw(temp_dir.path(), &mut df);

    let report = AggregationJob::new(config.clone())
        .without_progress()
        .run()
        .unwrap();
    assert!(report.verify_counts().is_empty());

    let hourly = HourlyRow::from_frame(&read_parquet(&config.summary_path(SummaryKind::Hourly)))
        .unwrap();
    let keys: HashSet<Option<i32>> = hourly.iter().map(|r| r.hour).collect();
    assert_eq!(hourly.len(), 3);
    assert_eq!(keys, HashSet::from([None, Some(0), Some(5)]));

    let daily =
        DailyRow::from_frame(&read_parquet(&config.summary_path(SummaryKind::Daily))).unwrap();
    let null_day = daily.iter().find(|r| r.day.is_none()).unwrap();
    assert_eq!(null_day.trip_count, 1);
    assert_eq!(daily.iter().filter(|r| r.day == Some(4)).count(), 1);
}
