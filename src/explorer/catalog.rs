//! Table catalog for an explorer session
//!
//! Holds the raw trip table and the three derived summaries in memory.
//! Absent or unreadable files do not fail the load: every view asks the
//! catalog for its table through [`Catalog::load_or_report`] and renders a
//! "no data" state when the table is unavailable.

use crate::config::ExplorerConfig;
use crate::constants::tables;
use crate::error::{ExplorerError, Result};
use crate::models::SummaryKind;

use polars::prelude::*;
use polars::sql::SQLContext;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Availability of one table
#[derive(Clone)]
pub enum TableStatus {
    Loaded(LazyFrame),
    NoData {
        table: &'static str,
        path: PathBuf,
        reason: String,
    },
}

impl TableStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, TableStatus::Loaded(_))
    }
}

impl fmt::Debug for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Loaded(_) => f.write_str("Loaded"),
            TableStatus::NoData { table, path, reason } => f
                .debug_struct("NoData")
                .field("table", table)
                .field("path", path)
                .field("reason", reason)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    table: &'static str,
    path: PathBuf,
    frame: std::result::Result<DataFrame, String>,
}

/// In-memory tables of one session
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load every table whose file exists
    pub fn load(config: &ExplorerConfig) -> Result<Self> {
        let mut sources = vec![(tables::RAW_TRIPS, config.raw_path())];
        sources.extend(
            SummaryKind::ALL
                .iter()
                .map(|kind| (kind.table_name(), config.summary_path(*kind))),
        );

        let mut entries = Vec::with_capacity(sources.len());
        for (table, path) in sources {
            let frame = match read_table(&path) {
                Ok(df) => {
                    debug!("Loaded table {} ({} rows)", table, df.height());
                    Ok(df)
                }
                Err(ExplorerError::MissingInput { .. }) => {
                    warn!("Table {} not available: {} not found", table, path.display());
                    Err(format!("{} not found", path.display()))
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Table {} could not be read: {}", table, e);
                    Err(e.to_string())
                }
            };
            entries.push(CatalogEntry { table, path, frame });
        }

        Ok(Self { entries })
    }

    /// Uniform access for views: the table, or the reason it is unavailable
    pub fn load_or_report(&self, table: &str) -> TableStatus {
        let Some(entry) = self.entry(table) else {
            return TableStatus::NoData {
                table: "unknown",
                path: PathBuf::new(),
                reason: format!("no table named '{}'", table),
            };
        };

        match &entry.frame {
            Ok(df) => TableStatus::Loaded(df.clone().lazy()),
            Err(reason) => TableStatus::NoData {
                table: entry.table,
                path: entry.path.clone(),
                reason: reason.clone(),
            },
        }
    }

    pub fn is_loaded(&self, table: &str) -> bool {
        self.entry(table).is_some_and(|e| e.frame.is_ok())
    }

    fn entry(&self, table: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.table == table)
    }

    /// Names of the tables that loaded successfully
    pub fn loaded_tables(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.frame.is_ok())
            .map(|e| e.table)
            .collect()
    }

    /// Fresh SQL context with every loaded table registered
    pub fn sql_context(&self) -> SQLContext {
        let mut ctx = SQLContext::new();
        for entry in &self.entries {
            if let Ok(df) = &entry.frame {
                ctx.register(entry.table, df.clone().lazy());
            }
        }
        ctx
    }
}

fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ExplorerError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;
    Ok(df)
}
