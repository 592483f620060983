//! Result export to CSV or JSON text.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::value_to_text;
use crate::{QueryResult, Result, SqlRunnerError};

/// Output format for exported results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "query_results.csv",
            ExportFormat::Json => "query_results.json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn render(&self, result: &QueryResult) -> Result<String> {
        match self {
            ExportFormat::Csv => Ok(to_csv(result)),
            ExportFormat::Json => to_json(result),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = SqlRunnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(SqlRunnerError::ValidationError(format!(
                "Unknown export format '{}' (expected 'csv' or 'json')",
                other
            ))),
        }
    }
}

/// Header line of comma-joined column names, then one line per row with every
/// value wrapped in double quotes. Quotes inside values are not escaped.
///
/// A cell whose column is absent from the row is written as `""`, not as the
/// text `undefined`, and an empty result still yields the header line rather
/// than nothing. Both differ from a browser-side export.
pub fn to_csv(result: &QueryResult) -> String {
    let mut lines = Vec::with_capacity(result.rows.len() + 1);
    lines.push(result.columns.join(","));

    for row in &result.rows {
        let line = result
            .columns
            .iter()
            .map(|column| {
                let text = row.get(column).map(value_to_text).unwrap_or_default();
                format!("\"{}\"", text)
            })
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// Pretty-printed JSON array of the result rows.
pub fn to_json(result: &QueryResult) -> Result<String> {
    serde_json::to_string_pretty(&result.rows)
        .map_err(|e| SqlRunnerError::InternalError(format!("Failed to serialize rows: {}", e)))
}
