//! Dashboard views over the catalog
//!
//! The overview is computed live from the raw table under the current
//! filter. The hourly, daily and payment views read the persisted summaries
//! as-is and are not re-filtered.

use super::catalog::{Catalog, TableStatus};
use super::filter::{FilterBounds, TripFilter, date_from_epoch_days};
use crate::constants::{payment_label, raw, tables};
use crate::error::Result;
use crate::models::{DailyRow, HourlyRow, PaymentRow, SummaryKind, scalar_f64, scalar_i64};

use polars::prelude::*;
use tracing::warn;

/// Render state of one view
#[derive(Debug, Clone)]
pub enum ViewState<T> {
    /// The backing table is unavailable
    NoData { message: String },
    /// The table loaded but this view could not be computed from it
    Error { message: String },
    /// Data over the full dataset
    Loaded(T),
    /// Data restricted by an active filter
    Filtered(T),
}

impl<T> ViewState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(data) | ViewState::Filtered(data) => Some(data),
            ViewState::NoData { .. } | ViewState::Error { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ViewState::Loaded(data) | ViewState::Filtered(data) => Some(data),
            ViewState::NoData { .. } | ViewState::Error { .. } => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ViewState::NoData { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error { .. })
    }

    /// Message shown instead of the view's data, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            ViewState::NoData { message } | ViewState::Error { message } => Some(message),
            ViewState::Loaded(_) | ViewState::Filtered(_) => None,
        }
    }
}

/// Keep a non-fatal failure inside the view that produced it
fn contain<T>(view: &str, result: Result<ViewState<T>>) -> Result<ViewState<T>> {
    match result {
        Err(e) if !e.is_fatal() => {
            warn!("{} view failed: {}", view, e);
            Ok(ViewState::Error {
                message: format!("{} view unavailable: {}", view, e),
            })
        }
        other => other,
    }
}

/// Headline metrics and a preview sample of the filtered raw table
#[derive(Debug, Clone)]
pub struct Overview {
    pub row_count: usize,
    pub avg_distance: Option<f64>,
    pub avg_amount: Option<f64>,
    pub total_amount: f64,
    pub preview: DataFrame,
}

#[derive(Debug, Clone)]
pub struct HourlyView {
    pub rows: Vec<HourlyRow>,
    pub busiest_hour: Option<HourlyRow>,
}

#[derive(Debug, Clone)]
pub struct DailyView {
    pub rows: Vec<DailyRow>,
    pub peak_day: Option<DailyRow>,
}

/// Payment summary row with its display label
#[derive(Debug, Clone)]
pub struct PaymentEntry {
    pub label: String,
    pub row: PaymentRow,
}

#[derive(Debug, Clone)]
pub struct PaymentView {
    pub rows: Vec<PaymentEntry>,
    pub most_common: Option<String>,
    pub highest_average: Option<String>,
}

/// Label for a group whose key is null
pub const NOT_RECORDED: &str = "Not recorded";

const NO_RAW_DATA: &str =
    "No data available. Run `taxi-explorer fetch` to download the dataset.";

fn no_summary_data(kind: SummaryKind) -> String {
    format!(
        "{} summary not available. Run `taxi-explorer aggregate` first.",
        capitalize(&kind.to_string())
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Filter defaults spanning the whole dataset
///
/// `None` without raw data, or when the extent cannot be computed.
pub fn filter_bounds(catalog: &Catalog) -> Result<Option<FilterBounds>> {
    let TableStatus::Loaded(trips) = catalog.load_or_report(tables::RAW_TRIPS) else {
        return Ok(None);
    };

    match data_extent(trips) {
        Ok(bounds) => Ok(Some(bounds)),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!("Could not compute filter bounds: {}", e);
            Ok(None)
        }
    }
}

fn data_extent(trips: LazyFrame) -> Result<FilterBounds> {
    let pickup_days = col(raw::PICKUP_DATETIME)
        .cast(DataType::Date)
        .cast(DataType::Int32);
    let df = trips
        .select([
            pickup_days.clone().min().alias("min_date"),
            pickup_days.max().alias("max_date"),
            col(raw::TRIP_DISTANCE)
                .cast(DataType::Float64)
                .max()
                .alias("max_distance"),
        ])
        .collect()?;

    let min_date = scalar_i64(&df, "min_date")?.and_then(date_from_epoch_days);
    let max_date = scalar_i64(&df, "max_date")?.and_then(date_from_epoch_days);
    let max_distance = scalar_f64(&df, "max_distance")?;

    Ok(FilterBounds::from_extent(min_date, max_date, max_distance))
}

/// Count, means, total and preview of the raw table under `filter`
pub fn overview(
    catalog: &Catalog,
    filter: &TripFilter,
    preview_rows: usize,
) -> Result<ViewState<Overview>> {
    match catalog.load_or_report(tables::RAW_TRIPS) {
        TableStatus::Loaded(trips) => {
            contain("Overview", filtered_overview(trips, filter, preview_rows))
        }
        TableStatus::NoData { .. } => Ok(ViewState::NoData {
            message: NO_RAW_DATA.to_string(),
        }),
    }
}

fn filtered_overview(
    trips: LazyFrame,
    filter: &TripFilter,
    preview_rows: usize,
) -> Result<ViewState<Overview>> {
    let filtered = filter.apply(trips);
    let metrics = filtered
        .clone()
        .select([
            len().alias("rows"),
            col(raw::TRIP_DISTANCE)
                .cast(DataType::Float64)
                .mean()
                .alias("avg_distance"),
            col(raw::TOTAL_AMOUNT)
                .cast(DataType::Float64)
                .mean()
                .alias("avg_amount"),
            col(raw::TOTAL_AMOUNT)
                .cast(DataType::Float64)
                .sum()
                .alias("total_amount"),
        ])
        .collect()?;

    let preview = filtered.limit(preview_rows as IdxSize).collect()?;

    let overview = Overview {
        row_count: scalar_i64(&metrics, "rows")?.unwrap_or_default() as usize,
        avg_distance: scalar_f64(&metrics, "avg_distance")?,
        avg_amount: scalar_f64(&metrics, "avg_amount")?,
        total_amount: scalar_f64(&metrics, "total_amount")?.unwrap_or_default(),
        preview,
    };

    Ok(if filter.is_active() {
        ViewState::Filtered(overview)
    } else {
        ViewState::Loaded(overview)
    })
}

/// Resolve a summary table, reporting missing raw data first
fn summary_frame(
    catalog: &Catalog,
    kind: SummaryKind,
) -> Result<std::result::Result<DataFrame, String>> {
    if !catalog.is_loaded(tables::RAW_TRIPS) {
        return Ok(Err(NO_RAW_DATA.to_string()));
    }
    match catalog.load_or_report(kind.table_name()) {
        TableStatus::Loaded(lf) => Ok(Ok(lf.collect()?)),
        TableStatus::NoData { .. } => Ok(Err(no_summary_data(kind))),
    }
}

/// First item with the largest key; earlier items win ties
fn first_max_by<T, K: PartialOrd>(items: &[T], key: impl Fn(&T) -> Option<K>) -> Option<&T> {
    let mut best: Option<(&T, K)> = None;
    for item in items {
        if let Some(k) = key(item) {
            let better = match &best {
                Some((_, best_key)) => k > *best_key,
                None => true,
            };
            if better {
                best = Some((item, k));
            }
        }
    }
    best.map(|(item, _)| item)
}

pub fn hourly_view(catalog: &Catalog) -> Result<ViewState<HourlyView>> {
    contain("Hourly", hourly_rows(catalog))
}

pub fn daily_view(catalog: &Catalog) -> Result<ViewState<DailyView>> {
    contain("Daily", daily_rows(catalog))
}

pub fn payment_view(catalog: &Catalog) -> Result<ViewState<PaymentView>> {
    contain("Payment", payment_rows(catalog))
}

// Insights below ignore rows whose key is null

fn hourly_rows(catalog: &Catalog) -> Result<ViewState<HourlyView>> {
    let df = match summary_frame(catalog, SummaryKind::Hourly)? {
        Ok(df) => df,
        Err(message) => return Ok(ViewState::NoData { message }),
    };

    let rows = HourlyRow::from_frame(&df)?;
    let busiest_hour = first_max_by(&rows, |r| r.hour.map(|_| r.trip_count)).cloned();
    Ok(ViewState::Loaded(HourlyView { rows, busiest_hour }))
}

fn daily_rows(catalog: &Catalog) -> Result<ViewState<DailyView>> {
    let df = match summary_frame(catalog, SummaryKind::Daily)? {
        Ok(df) => df,
        Err(message) => return Ok(ViewState::NoData { message }),
    };

    let rows = DailyRow::from_frame(&df)?;
    let peak_day = first_max_by(&rows, |r| r.day.map(|_| r.trip_count)).cloned();
    Ok(ViewState::Loaded(DailyView { rows, peak_day }))
}

fn payment_rows(catalog: &Catalog) -> Result<ViewState<PaymentView>> {
    let df = match summary_frame(catalog, SummaryKind::Payment)? {
        Ok(df) => df,
        Err(message) => return Ok(ViewState::NoData { message }),
    };

    let rows: Vec<PaymentEntry> = PaymentRow::from_frame(&df)?
        .into_iter()
        .map(|row| PaymentEntry {
            label: row
                .payment_type
                .map(payment_label)
                .unwrap_or_else(|| NOT_RECORDED.to_string()),
            row,
        })
        .collect();

    let most_common = first_max_by(&rows, |e| Some(e.row.count)).map(|e| e.label.clone());
    let highest_average = first_max_by(&rows, |e| e.row.avg_amount).map(|e| e.label.clone());

    Ok(ViewState::Loaded(PaymentView {
        rows,
        most_common,
        highest_average,
    }))
}
