//! Application constants for the taxi explorer
//!
//! Fixed file locations, the remote source, queryable table names, and the
//! column names of the raw and derived datasets.

// =============================================================================
// Files and Remote Source
// =============================================================================

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Raw trip dataset file name
pub const RAW_FILE_NAME: &str = "yellow_taxi_2022_01.parquet";

/// Derived summary file names
pub const HOURLY_FILE_NAME: &str = "hourly_trips.parquet";
pub const DAILY_FILE_NAME: &str = "daily_trips.parquet";
pub const PAYMENT_FILE_NAME: &str = "payment_types.parquet";

/// NYC TLC yellow taxi trip records for January 2022
pub const DEFAULT_SOURCE_URL: &str =
    "https://d37ci6vzurychx.cloudfront.net/trip-data/yellow_tripdata_2022-01.parquet";

/// Suffix for in-flight downloads
pub const PARTIAL_DOWNLOAD_SUFFIX: &str = "part";

// =============================================================================
// Queryable Tables
// =============================================================================

pub mod tables {
    pub const RAW_TRIPS: &str = "raw_trips";
    pub const HOURLY_SUMMARY: &str = "hourly_summary";
    pub const DAILY_SUMMARY: &str = "daily_summary";
    pub const PAYMENT_SUMMARY: &str = "payment_summary";

    /// Every table name the query interface exposes
    pub const ALL: &[&str] = &[RAW_TRIPS, HOURLY_SUMMARY, DAILY_SUMMARY, PAYMENT_SUMMARY];
}

// =============================================================================
// Column Names
// =============================================================================

/// Raw trip record columns
pub mod raw {
    pub const PICKUP_DATETIME: &str = "tpep_pickup_datetime";
    pub const TRIP_DISTANCE: &str = "trip_distance";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const PAYMENT_TYPE: &str = "payment_type";

    /// Optional columns, reported on when present
    pub const FARE_AMOUNT: &str = "fare_amount";
    pub const TIP_AMOUNT: &str = "tip_amount";

    pub const REQUIRED: &[&str] = &[PICKUP_DATETIME, TRIP_DISTANCE, TOTAL_AMOUNT, PAYMENT_TYPE];
}

/// Derived summary columns
pub mod summary {
    pub const HOUR: &str = "hour";
    pub const DAY: &str = "day";
    pub const TRIP_COUNT: &str = "trip_count";
    pub const COUNT: &str = "count";
    pub const AVG_DISTANCE: &str = "avg_distance";
    pub const AVG_AMOUNT: &str = "avg_amount";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const PAYMENT_TYPE: &str = "payment_type";
}

// =============================================================================
// Explorer Defaults
// =============================================================================

/// Upper bound on preview sample rows
pub const MAX_PREVIEW_ROWS: usize = 10;

/// Rows shown by the aggregation report sample
pub const REPORT_SAMPLE_ROWS: usize = 5;

/// Distance slider step in miles
pub const DISTANCE_STEP_MILES: f64 = 10.0;

/// Example query offered to the user
pub const DEFAULT_QUERY: &str = "SELECT COUNT(*) AS trip_count, AVG(total_amount) AS avg_fare\n\
FROM raw_trips\n\
WHERE trip_distance > 5";

/// Human-readable payment method label for a TLC payment code
pub fn payment_label(code: i64) -> String {
    match code {
        1 => "Credit card".to_string(),
        2 => "Cash".to_string(),
        3 => "No charge".to_string(),
        4 => "Dispute".to_string(),
        5 => "Unknown".to_string(),
        6 => "Voided trip".to_string(),
        other => format!("Type {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_labels() {
        assert_eq!(payment_label(1), "Credit card");
        assert_eq!(payment_label(6), "Voided trip");
        assert_eq!(payment_label(0), "Type 0");
        assert_eq!(payment_label(42), "Type 42");
    }

    #[test]
    fn test_table_namespace() {
        assert_eq!(tables::ALL.len(), 4);
        assert!(tables::ALL.contains(&"raw_trips"));
    }
}
