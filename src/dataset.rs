//! Row, dataset and result types shared by ingestion, readers and writers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record: column name to value, in insertion order.
///
/// A column missing from a row is absent (no key), which is different from an
/// explicit JSON `null`.
pub type Row = Map<String, Value>;

/// Column names of the first row, in order. Empty when there are no rows.
pub fn first_row_columns(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Text form of a value the way a browser would print it: strings verbatim,
/// arrays comma-joined, objects as `[object Object]`.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// The rows produced by ingesting one file.
///
/// A dataset is never mutated after ingestion; uploading another file replaces
/// it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// File name the dataset was ingested from
    pub name: String,
    pub rows: Vec<Row>,
    pub columns: Vec<String>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, rows: Vec<Row>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            rows,
            columns,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Rows and columns returned by a query run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub columns: Vec<String>,
}

impl QueryResult {
    pub fn new(rows: Vec<Row>, columns: Vec<String>) -> Self {
        Self { rows, columns }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Keep at most `max_rows` rows (0 = unlimited).
    ///
    /// Returns the row count before truncation and whether rows were dropped.
    pub fn limit_rows(&mut self, max_rows: usize) -> (usize, bool) {
        let total = self.rows.len();
        if max_rows > 0 && total > max_rows {
            self.rows.truncate(max_rows);
            (total, true)
        } else {
            (total, false)
        }
    }
}
