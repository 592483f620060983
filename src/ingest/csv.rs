//! CSV ingestion.
//!
//! Deliberately small: a `"` toggles quoting and is dropped, a comma outside
//! quotes ends a field. There is no escaped-quote (`""`) handling and no
//! multi-line fields.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::dataset::first_row_columns;
use crate::{Result, Row, SqlRunnerError};

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    // Alternation order matters: `\r\n` must win over a lone `\r`
    Regex::new(r"\r\n|\n|\r").expect("line break pattern is valid")
});

/// Parse CSV text into rows and their column list.
///
/// Columns are the keys of the first data row, so repeated header names
/// collapse to one entry and headers past a short first row are not listed.
pub fn parse_csv(text: &str) -> Result<(Vec<Row>, Vec<String>)> {
    if text.trim().is_empty() {
        return Err(SqlRunnerError::EmptyFile("File is empty".to_string()));
    }

    let mut lines = LINE_BREAK
        .split(text)
        .filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| SqlRunnerError::EmptyFile("No data found in CSV file".to_string()))?;
    let headers = parse_header(header);

    let rows: Vec<Row> = lines
        .map(|line| {
            let fields = split_fields(line);
            headers
                .iter()
                .zip(fields)
                .map(|(column, field)| (column.clone(), Value::String(field)))
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return Err(SqlRunnerError::EmptyFile(
            "No data rows found in the file".to_string(),
        ));
    }

    let columns = first_row_columns(&rows);
    Ok((rows, columns))
}

/// Header names: split on every comma, trim, drop one surrounding quote each side.
pub fn parse_header(line: &str) -> Vec<String> {
    line.split(',')
        .map(|token| {
            let token = token.trim();
            let token = token.strip_prefix('"').unwrap_or(token);
            let token = token.strip_suffix('"').unwrap_or(token);
            token.to_string()
        })
        .collect()
}

/// Split one data line into fields, honoring quoted commas.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);

    fields
}
