//! Trip filters applied to the raw table
//!
//! Both dimensions are optional and inclusive. Active filters are conjoined
//! into one predicate used by every raw-table query in a render pass.

use crate::constants::{raw, DISTANCE_STEP_MILES};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Inclusive pickup-date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Inclusive trip-distance range in miles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRange {
    pub min: f64,
    pub max: f64,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn to_expr(self) -> Expr {
        let pickup_date = col(raw::PICKUP_DATETIME).cast(DataType::Date);
        pickup_date
            .clone()
            .gt_eq(lit(self.start))
            .and(pickup_date.lt_eq(lit(self.end)))
    }
}

impl DistanceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn to_expr(self) -> Expr {
        let distance = col(raw::TRIP_DISTANCE);
        distance
            .clone()
            .gt_eq(lit(self.min))
            .and(distance.lt_eq(lit(self.max)))
    }
}

/// Optional, independent restrictions on the raw trip table
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TripFilter {
    pub date: Option<DateRange>,
    pub distance: Option<DistanceRange>,
}

impl TripFilter {
    /// No restriction on any dimension
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date = Some(DateRange::new(start, end));
        self
    }

    pub fn with_distance_range(mut self, min: f64, max: f64) -> Self {
        self.distance = Some(DistanceRange::new(min, max));
        self
    }

    pub fn is_active(&self) -> bool {
        self.date.is_some() || self.distance.is_some()
    }

    /// Conjunction of all active predicates, `None` when unrestricted
    pub fn to_expr(&self) -> Option<Expr> {
        let predicates = [
            self.date.map(DateRange::to_expr),
            self.distance.map(DistanceRange::to_expr),
        ];
        predicates.into_iter().flatten().reduce(|acc, p| acc.and(p))
    }

    pub fn apply(&self, trips: LazyFrame) -> LazyFrame {
        match self.to_expr() {
            Some(predicate) => trips.filter(predicate),
            None => trips,
        }
    }
}

/// Full extent of the data, used as filter defaults
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterBounds {
    pub date: Option<DateRange>,
    /// Slider extent: 0 up to the next multiple of 10 miles above the maximum
    pub distance: Option<DistanceRange>,
}

impl FilterBounds {
    pub fn from_extent(
        min_date: Option<NaiveDate>,
        max_date: Option<NaiveDate>,
        max_distance: Option<f64>,
    ) -> Self {
        let date = match (min_date, max_date) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        };
        let distance = max_distance.map(|max| DistanceRange::new(0.0, slider_ceiling(max)));
        Self { date, distance }
    }
}

/// Next multiple of the slider step strictly above `max`
pub fn slider_ceiling(max: f64) -> f64 {
    let step = DISTANCE_STEP_MILES;
    ((max / step).floor() + 1.0) * step
}

/// Convert polars' days-since-epoch date representation
pub(crate) fn date_from_epoch_days(days: i64) -> Option<NaiveDate> {
    const EPOCH_DAYS_FROM_CE: i64 = 719_163;
    i32::try_from(days + EPOCH_DAYS_FROM_CE)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}
