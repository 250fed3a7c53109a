//! Free-form SQL over the loaded tables
//!
//! Each query runs in a fresh `SQLContext` built from the catalog, so a
//! failed or table-altering statement never affects later queries.

use super::catalog::Catalog;
use crate::error::{ExplorerError, Result};

use polars::prelude::DataFrame;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Execute `sql` against the session's tables
///
/// Any engine failure, including a panic inside the engine, is returned as
/// `ExplorerError::Query` carrying the engine's message.
pub fn run_query(catalog: &Catalog, sql: &str) -> Result<DataFrame> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(ExplorerError::query("query text is empty"));
    }

    debug!("Executing query: {}", sql);
    let mut ctx = catalog.sql_context();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        ctx.execute(sql).and_then(|lf| lf.collect())
    }));

    match outcome {
        Ok(Ok(df)) => {
            debug!("Query returned {} rows", df.height());
            Ok(df)
        }
        Ok(Err(e)) => Err(ExplorerError::query(e)),
        Err(payload) => Err(ExplorerError::query(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "query engine panicked".to_string()
    }
}
