//! Shared fixtures for unit tests: small trip datasets written as Parquet.

use crate::config::ExplorerConfig;
use crate::constants::raw;
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// One synthetic trip: pickup time, distance, total amount, payment code
pub type TripRecord<'a> = (&'a str, f64, f64, i64);

/// Build a raw trip frame with the NYC TLC column names
pub fn trip_frame(trips: &[TripRecord<'_>]) -> DataFrame {
    let trips: Vec<_> = trips
        .iter()
        .map(|&(pickup, distance, amount, payment)| (Some(pickup), distance, amount, payment))
        .collect();
    trip_frame_with_gaps(&trips)
}

/// Like [`trip_frame`], with `None` for a trip whose pickup time is missing
pub fn trip_frame_with_gaps(trips: &[(Option<&str>, f64, f64, i64)]) -> DataFrame {
    let micros: Vec<Option<i64>> = trips
        .iter()
        .map(|(pickup, ..)| {
            pickup.map(|p| {
                NaiveDateTime::parse_from_str(p, "%Y-%m-%d %H:%M:%S")
                    .unwrap()
                    .and_utc()
                    .timestamp_micros()
            })
        })
        .collect();

    let pickup = Series::new(raw::PICKUP_DATETIME.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .unwrap();
    let distance: Vec<f64> = trips.iter().map(|t| t.1).collect();
    let amount: Vec<f64> = trips.iter().map(|t| t.2).collect();
    let payment: Vec<i64> = trips.iter().map(|t| t.3).collect();

    DataFrame::new(vec![
        pickup.into_column(),
        Series::new(raw::TRIP_DISTANCE.into(), distance).into_column(),
        Series::new(raw::TOTAL_AMOUNT.into(), amount).into_column(),
        Series::new(raw::PAYMENT_TYPE.into(), payment).into_column(),
    ])
    .unwrap()
}

/// A week of trips across several hours, days and payment methods
pub fn sample_trips() -> DataFrame {
    trip_frame(&[
        ("2022-01-01 00:15:00", 1.2, 9.5, 1),
        ("2022-01-01 08:30:00", 3.4, 18.0, 1),
        ("2022-01-01 08:45:00", 0.8, 7.3, 2),
        ("2022-01-02 17:05:00", 5.1, 24.6, 1),
        ("2022-01-02 18:10:00", 12.7, 52.3, 1),
        ("2022-01-03 18:20:00", 2.2, 13.1, 2),
        ("2022-01-03 18:55:00", 0.0, 3.3, 3),
        ("2022-01-05 23:40:00", 7.9, 31.8, 1),
        ("2022-01-07 18:00:00", 4.4, 20.2, 4),
        ("2022-01-07 12:00:00", 15.3, 61.0, 2),
    ])
}

pub fn write_parquet(df: &mut DataFrame, path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();
}

/// Write `df` as the raw dataset of a config rooted at `data_dir`
pub fn config_with_raw(data_dir: &Path, df: &mut DataFrame) -> ExplorerConfig {
    let config = ExplorerConfig::default().with_data_dir(data_dir);
    write_parquet(df, &config.raw_path());
    config
}
