//! Core data structures and types for trip aggregation.
//!
//! Defines the derived summary kinds, their row types, dataset statistics,
//! and small helpers for reading typed values back out of Polars frames.

use crate::constants::{summary, tables};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Derived summaries produced by the aggregation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryKind {
    Hourly,
    Daily,
    Payment,
}

impl SummaryKind {
    pub const ALL: [SummaryKind; 3] = [SummaryKind::Hourly, SummaryKind::Daily, SummaryKind::Payment];

    /// Table name exposed to the query interface
    pub fn table_name(&self) -> &'static str {
        match self {
            SummaryKind::Hourly => tables::HOURLY_SUMMARY,
            SummaryKind::Daily => tables::DAILY_SUMMARY,
            SummaryKind::Payment => tables::PAYMENT_SUMMARY,
        }
    }

    /// Column holding the per-group trip count
    pub fn count_column(&self) -> &'static str {
        match self {
            SummaryKind::Hourly | SummaryKind::Daily => summary::TRIP_COUNT,
            SummaryKind::Payment => summary::COUNT,
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SummaryKind::Hourly => "hourly",
            SummaryKind::Daily => "daily",
            SummaryKind::Payment => "payment",
        };
        f.write_str(name)
    }
}

/// Trips per hour of day; `hour` is `None` for trips without a pickup time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRow {
    pub hour: Option<i32>,
    pub trip_count: i64,
}

/// Trips per day of month with distance and amount means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    pub day: Option<i32>,
    pub trip_count: i64,
    pub avg_distance: Option<f64>,
    pub avg_amount: Option<f64>,
}

/// Trips per payment method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub payment_type: Option<i64>,
    pub count: i64,
    pub avg_amount: Option<f64>,
    pub total_amount: Option<f64>,
}

impl HourlyRow {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let hours = i64_values(df, summary::HOUR)?;
        let counts = i64_values(df, summary::TRIP_COUNT)?;
        Ok(hours
            .into_iter()
            .zip(counts)
            .map(|(hour, count)| HourlyRow {
                hour: hour.map(|h| h as i32),
                trip_count: count.unwrap_or_default(),
            })
            .collect())
    }
}

impl DailyRow {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let days = i64_values(df, summary::DAY)?;
        let counts = i64_values(df, summary::TRIP_COUNT)?;
        let distances = f64_values(df, summary::AVG_DISTANCE)?;
        let amounts = f64_values(df, summary::AVG_AMOUNT)?;

        Ok(days
            .into_iter()
            .zip(counts)
            .zip(distances.into_iter().zip(amounts))
            .map(|((day, count), (avg_distance, avg_amount))| DailyRow {
                day: day.map(|d| d as i32),
                trip_count: count.unwrap_or_default(),
                avg_distance,
                avg_amount,
            })
            .collect())
    }
}

impl PaymentRow {
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let codes = i64_values(df, summary::PAYMENT_TYPE)?;
        let counts = i64_values(df, summary::COUNT)?;
        let averages = f64_values(df, summary::AVG_AMOUNT)?;
        let totals = f64_values(df, summary::TOTAL_AMOUNT)?;

        Ok(codes
            .into_iter()
            .zip(counts)
            .zip(averages.into_iter().zip(totals))
            .map(|((payment_type, count), (avg_amount, total_amount))| PaymentRow {
                payment_type,
                count: count.unwrap_or_default(),
                avg_amount,
                total_amount,
            })
            .collect())
    }
}

/// Whole-dataset statistics printed by the aggregation report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripStatistics {
    pub row_count: usize,
    pub avg_distance: Option<f64>,
    pub avg_fare: Option<f64>,
    pub avg_tip: Option<f64>,
    pub avg_total: Option<f64>,
}

/// Aggregation run statistics
#[derive(Debug, Default)]
pub struct AggregationStats {
    pub summaries_written: usize,
    pub summaries_failed: usize,
    pub raw_rows: usize,
    pub output_dir: PathBuf,
    pub processing_time_ms: u128,
}

/// Read a column as nullable i64 values, casting integer widths as needed
pub(crate) fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.as_materialized_series().i64()?.into_iter().collect())
}

/// Read a column as nullable f64 values
pub(crate) fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.as_materialized_series().f64()?.into_iter().collect())
}

/// First value of a column as f64; `None` for an empty or null result
pub(crate) fn scalar_f64(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    Ok(f64_values(df, name)?.into_iter().next().flatten())
}

/// First value of a column as i64; `None` for an empty or null result
pub(crate) fn scalar_i64(df: &DataFrame, name: &str) -> Result<Option<i64>> {
    Ok(i64_values(df, name)?.into_iter().next().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_kind_names() {
        assert_eq!(SummaryKind::Hourly.to_string(), "hourly");
        assert_eq!(SummaryKind::Payment.table_name(), "payment_summary");
        assert_eq!(SummaryKind::Daily.count_column(), "trip_count");
        assert_eq!(SummaryKind::Payment.count_column(), "count");
    }

    #[test]
    fn test_hourly_rows_from_frame() {
        let df = df!(
            "hour" => [0i32, 7, 18],
            "trip_count" => [3i64, 10, 25],
        )
        .unwrap();

        let rows = HourlyRow::from_frame(&df).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1],
            HourlyRow {
                hour: Some(7),
                trip_count: 10
            }
        );
    }

    #[test]
    fn test_scalar_helpers_handle_nulls() {
        let df = df!("mean" => [None::<f64>]).unwrap();
        assert_eq!(scalar_f64(&df, "mean").unwrap(), None);

        let df = df!("n" => [12u32]).unwrap();
        assert_eq!(scalar_i64(&df, "n").unwrap(), Some(12));
    }

    #[test]
    fn test_null_keys_stay_null() {
        let df = df!(
            "day" => [None, Some(3i32)],
            "trip_count" => [2i64, 5],
            "avg_distance" => [1.0, 2.0],
            "avg_amount" => [10.0, 20.0],
        )
        .unwrap();

        let rows = DailyRow::from_frame(&df).unwrap();
        assert_eq!(rows[0].day, None);
        assert_eq!(rows[1].day, Some(3));
    }

    #[test]
    fn test_missing_column_is_error() {
        let df = df!("hour" => [1i32]).unwrap();
        assert!(HourlyRow::from_frame(&df).is_err());
    }
}
