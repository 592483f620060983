//! Data source abstraction layer for sqlrunner
//!
//! The reader module provides a uniform interface for running a query against
//! one of the two data sources a user can pick and getting back
//! [`QueryResult`]s for display or export.
//!
//! # Architecture
//!
//! All readers implement the `Reader` trait, which provides:
//! - Query execution → `QueryResult` conversion
//! - Timed execution → `QueryOutcome`
//!
//! Two readers exist:
//! - [`FileReader`] runs the filter/project interpreter over an ingested
//!   [`Dataset`]
//! - [`SampleReader`] serves the built-in sample tables by keyword lookup
//!
//! # Example
//!
//! ```rust
//! use sqlrunner::reader::{Reader, SampleReader};
//!
//! let reader = SampleReader::new();
//! let outcome = reader.execute("SELECT * FROM products").unwrap();
//! assert!(outcome.result.columns.contains(&"product_name".to_string()));
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::first_row_columns;
use crate::{query, Dataset, QueryResult, Result, SqlRunnerError};

pub mod data;

pub use data::{sample_table, SAMPLE_TABLES};

// ============================================================================
// QueryOutcome - Result of reader.execute()
// ============================================================================

/// A query result together with how long it took to produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub result: QueryResult,
    /// Wall-clock execution time in milliseconds
    pub execution_time_ms: f64,
}

// ============================================================================
// DataSource
// ============================================================================

/// Where a query runs: the built-in sample tables or the uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Sample,
    File,
}

impl FromStr for DataSource {
    type Err = SqlRunnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sample" | "database" => Ok(DataSource::Sample),
            "file" => Ok(DataSource::File),
            other => Err(SqlRunnerError::ValidationError(format!(
                "Unknown data source '{}' (expected 'sample' or 'file')",
                other
            ))),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Sample => write!(f, "sample"),
            DataSource::File => write!(f, "file"),
        }
    }
}

// ============================================================================
// Reader Trait
// ============================================================================

/// Trait for data source readers
///
/// Readers run a query string and return rows plus the column list. They
/// never fail on query text they do not understand; the only errors come
/// from [`execute`](Reader::execute) rejecting blank input.
pub trait Reader {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Run a query and return its result
    ///
    /// # Arguments
    ///
    /// * `query` - The query text to run
    fn execute_sql(&self, query: &str) -> Result<QueryResult>;

    /// Run a query and measure how long it took.
    ///
    /// # Errors
    ///
    /// Returns `SqlRunnerError::ValidationError` for a blank query.
    fn execute(&self, query: &str) -> Result<QueryOutcome> {
        if query.trim().is_empty() {
            return Err(SqlRunnerError::ValidationError(
                "Query is empty".to_string(),
            ));
        }

        let start = Instant::now();
        let result = self.execute_sql(query)?;
        let execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            "{} reader returned {} rows in {:.2} ms",
            self.name(),
            result.row_count(),
            execution_time_ms
        );

        Ok(QueryOutcome {
            result,
            execution_time_ms,
        })
    }
}

// ============================================================================
// FileReader
// ============================================================================

/// Runs queries against an ingested file.
#[derive(Debug, Clone)]
pub struct FileReader {
    dataset: Dataset,
}

impl FileReader {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl Reader for FileReader {
    fn name(&self) -> &str {
        "file"
    }

    fn execute_sql(&self, query: &str) -> Result<QueryResult> {
        Ok(query::run(query, &self.dataset.rows))
    }
}

// ============================================================================
// SampleReader
// ============================================================================

/// Keywords that route a query to a sample table. The first match wins.
const ROUTES: &[(&[&str], &str)] = &[
    (&["employee", "staff"], "employees"),
    (&["sale", "revenue"], "sales"),
    (&["product", "item"], "products"),
    (&["customer", "client"], "customers"),
];

const DEFAULT_TABLE: &str = "employees";

/// Serves the built-in sample tables.
///
/// The query is not interpreted: the first table whose keyword appears in the
/// lowercased query is returned whole, `employees` when nothing matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleReader;

impl SampleReader {
    pub fn new() -> Self {
        Self
    }

    /// Name of the table a query would be answered from
    pub fn route(query: &str) -> &'static str {
        let lower = query.to_lowercase();
        ROUTES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, table)| *table)
            .unwrap_or(DEFAULT_TABLE)
    }
}

impl Reader for SampleReader {
    fn name(&self) -> &str {
        "sample"
    }

    fn execute_sql(&self, query: &str) -> Result<QueryResult> {
        let table = Self::route(query);
        let rows = sample_table(table).ok_or_else(|| {
            SqlRunnerError::InternalError(format!("Sample table '{}' is missing", table))
        })?;
        let columns = first_row_columns(&rows);
        Ok(QueryResult::new(rows, columns))
    }
}

/// Pick the reader for a data source.
///
/// # Errors
///
/// `SqlRunnerError::NoDataSource` when `source` is `File` and no dataset is
/// loaded.
pub fn reader_for(source: DataSource, dataset: Option<Dataset>) -> Result<Box<dyn Reader>> {
    match (source, dataset) {
        (DataSource::Sample, _) => Ok(Box::new(SampleReader::new())),
        (DataSource::File, Some(dataset)) => Ok(Box::new(FileReader::new(dataset))),
        (DataSource::File, None) => Err(SqlRunnerError::NoDataSource),
    }
}
