//! Grouped aggregations behind the derived summaries
//!
//! Each builder takes the raw trip table as a lazy frame and returns the
//! lazy plan of one summary. Groups are formed with `group_by_stable` so
//! that re-running on unchanged input yields the same row order.

use crate::constants::{raw, summary};
use crate::error::Result;
use crate::models::{SummaryKind, TripStatistics, scalar_f64, scalar_i64};
use polars::prelude::*;

/// Lazy plan for one summary kind
pub fn summary_plan(kind: SummaryKind, trips: LazyFrame) -> LazyFrame {
    match kind {
        SummaryKind::Hourly => hourly_plan(trips),
        SummaryKind::Daily => daily_plan(trips),
        SummaryKind::Payment => payment_plan(trips),
    }
}

/// Trip count per hour of pickup, ascending by hour
pub fn hourly_plan(trips: LazyFrame) -> LazyFrame {
    trips
        .group_by_stable([col(raw::PICKUP_DATETIME)
            .dt()
            .hour()
            .cast(DataType::Int32)
            .alias(summary::HOUR)])
        .agg([len().cast(DataType::Int64).alias(summary::TRIP_COUNT)])
        .sort_by_exprs([col(summary::HOUR)], SortMultipleOptions::default())
}

/// Trip count, mean distance and mean amount per day of month, ascending by day
pub fn daily_plan(trips: LazyFrame) -> LazyFrame {
    trips
        .group_by_stable([col(raw::PICKUP_DATETIME)
            .dt()
            .day()
            .cast(DataType::Int32)
            .alias(summary::DAY)])
        .agg([
            len().cast(DataType::Int64).alias(summary::TRIP_COUNT),
            col(raw::TRIP_DISTANCE)
                .cast(DataType::Float64)
                .mean()
                .alias(summary::AVG_DISTANCE),
            col(raw::TOTAL_AMOUNT)
                .cast(DataType::Float64)
                .mean()
                .alias(summary::AVG_AMOUNT),
        ])
        .sort_by_exprs([col(summary::DAY)], SortMultipleOptions::default())
}

/// Count, mean amount and total amount per payment code, descending by count
///
/// Ties keep first-seen group order.
pub fn payment_plan(trips: LazyFrame) -> LazyFrame {
    trips
        .group_by_stable([col(raw::PAYMENT_TYPE)
            .cast(DataType::Int64)
            .alias(summary::PAYMENT_TYPE)])
        .agg([
            len().cast(DataType::Int64).alias(summary::COUNT),
            col(raw::TOTAL_AMOUNT)
                .cast(DataType::Float64)
                .mean()
                .alias(summary::AVG_AMOUNT),
            col(raw::TOTAL_AMOUNT)
                .cast(DataType::Float64)
                .sum()
                .alias(summary::TOTAL_AMOUNT),
        ])
        .sort_by_exprs(
            [col(summary::COUNT)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
}

/// Whole-table statistics: row count plus mean distance, fare, tip and total
///
/// Fare and tip are optional in the raw schema and reported only when present.
pub fn trip_statistics(trips: &LazyFrame) -> Result<TripStatistics> {
    let schema = trips.clone().collect_schema()?;
    let mean_of = |name: &str| -> Expr {
        if schema.contains(name) {
            col(name).cast(DataType::Float64).mean().alias(name)
        } else {
            lit(NULL).cast(DataType::Float64).alias(name)
        }
    };

    let df = trips
        .clone()
        .select([
            len().alias("rows"),
            mean_of(raw::TRIP_DISTANCE),
            mean_of(raw::FARE_AMOUNT),
            mean_of(raw::TIP_AMOUNT),
            mean_of(raw::TOTAL_AMOUNT),
        ])
        .collect()?;

    Ok(TripStatistics {
        row_count: scalar_i64(&df, "rows")?.unwrap_or_default() as usize,
        avg_distance: scalar_f64(&df, raw::TRIP_DISTANCE)?,
        avg_fare: scalar_f64(&df, raw::FARE_AMOUNT)?,
        avg_tip: scalar_f64(&df, raw::TIP_AMOUNT)?,
        avg_total: scalar_f64(&df, raw::TOTAL_AMOUNT)?,
    })
}
