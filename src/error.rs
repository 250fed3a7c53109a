//! Error handling for trip aggregation and exploration.
//!
//! Every failure is caught at the boundary of the operation that produced
//! it. Only I/O failures (disk full, permission denied) are allowed to end
//! a run.

use crate::models::SummaryKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Required input not found at path: {path}")]
    MissingInput { path: PathBuf },

    #[error("Aggregation failed for {summary} summary: {reason}")]
    Aggregation {
        summary: SummaryKind,
        reason: String,
    },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Transfer failed for {url}: {reason}")]
    Transfer { url: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Operation interrupted: {reason}")]
    Interrupted { reason: String },
}

impl ExplorerError {
    /// Wrap any engine failure raised while computing a summary
    pub fn aggregation(summary: SummaryKind, reason: impl ToString) -> Self {
        Self::Aggregation {
            summary,
            reason: reason.to_string(),
        }
    }

    /// Report a free-form query failure with the engine's message
    pub fn query(message: impl ToString) -> Self {
        Self::Query {
            message: message.to_string(),
        }
    }

    pub fn transfer(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transfer {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that should terminate the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Interrupted { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
