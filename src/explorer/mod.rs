//! Interactive explorer session.
//!
//! An [`Explorer`] owns the session's in-memory tables. The catalog is
//! loaded on first use and dropped with the session; a process restart is
//! needed to pick up files written after the first load.

pub mod catalog;
pub mod filter;
pub mod query;
pub mod views;

#[cfg(test)]
pub mod tests;

pub use self::catalog::{Catalog, TableStatus};
pub use self::filter::{DateRange, DistanceRange, FilterBounds, TripFilter};
pub use self::views::{
    DailyView, HourlyView, Overview, PaymentEntry, PaymentView, ViewState,
};

use crate::config::ExplorerConfig;
use crate::error::Result;
use polars::prelude::DataFrame;
use tracing::debug;

/// Single-user exploration session
#[derive(Debug)]
pub struct Explorer {
    config: ExplorerConfig,
    catalog: Option<Catalog>,
}

impl Explorer {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Session tables, loading them on first access
    pub fn catalog(&mut self) -> Result<&Catalog> {
        let catalog = match self.catalog.take() {
            Some(catalog) => catalog,
            None => {
                debug!("Loading tables from {}", self.config.data_dir().display());
                Catalog::load(&self.config)?
            }
        };
        Ok(self.catalog.insert(catalog))
    }

    /// Full data extent for filter defaults; `None` without raw data
    pub fn filter_bounds(&mut self) -> Result<Option<FilterBounds>> {
        views::filter_bounds(self.catalog()?)
    }

    pub fn overview(&mut self, filter: &TripFilter) -> Result<ViewState<Overview>> {
        let preview_rows = self.config.preview_limit();
        views::overview(self.catalog()?, filter, preview_rows)
    }

    pub fn hourly(&mut self) -> Result<ViewState<HourlyView>> {
        views::hourly_view(self.catalog()?)
    }

    pub fn daily(&mut self) -> Result<ViewState<DailyView>> {
        views::daily_view(self.catalog()?)
    }

    pub fn payment(&mut self) -> Result<ViewState<PaymentView>> {
        views::payment_view(self.catalog()?)
    }

    /// Run a free-form query; failures leave the session usable
    pub fn query(&mut self, sql: &str) -> Result<DataFrame> {
        query::run_query(self.catalog()?, sql)
    }
}
