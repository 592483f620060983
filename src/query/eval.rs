//! Evaluation of a [`ParsedQuery`] over rows.
//!
//! Comparisons follow loose browser semantics: a string cell compares as text,
//! numeric cells compare against the value read as a number, and a missing
//! cell never matches.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{CompareOp, Filter, ParsedQuery, Projection};
use crate::dataset::{first_row_columns, value_to_text};
use crate::{QueryResult, Row};

/// Run a parsed query over `rows`.
pub fn evaluate(parsed: &ParsedQuery, rows: &[Row]) -> QueryResult {
    match parsed {
        ParsedQuery::Passthrough => QueryResult::new(rows.to_vec(), first_row_columns(rows)),
        ParsedQuery::Select { projection, filter } => {
            let columns = match projection {
                Projection::All => first_row_columns(rows),
                Projection::Columns(columns) => columns.clone(),
            };

            let selected = rows
                .iter()
                .filter(|row| filter.as_ref().map_or(true, |f| f.matches(row)))
                .map(|row| project(row, &columns))
                .collect();

            QueryResult::new(selected, columns)
        }
    }
}

/// Copy the named columns of `row`, in order. Columns the row lacks stay absent.
fn project(row: &Row, columns: &[String]) -> Row {
    columns
        .iter()
        .filter_map(|column| row.get(column).map(|value| (column.clone(), value.clone())))
        .collect()
}

impl Filter {
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(&self.field);
        match &self.op {
            CompareOp::Eq => loose_eq(cell, &self.value.replace('\'', "")),
            CompareOp::Gt => compare(cell, &self.value) == Some(Ordering::Greater),
            CompareOp::Lt => compare(cell, &self.value) == Some(Ordering::Less),
            CompareOp::Unsupported(_) => true,
        }
    }
}

/// `cell == literal` with string-to-number coercion.
fn loose_eq(cell: Option<&Value>, literal: &str) -> bool {
    match cell {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => s == literal,
        Some(Value::Number(n)) => n.as_f64() == Some(to_number(literal)),
        Some(Value::Bool(b)) => bool_to_number(*b) == to_number(literal),
        Some(other) => value_to_text(other) == literal,
    }
}

/// Ordering of `cell` relative to `literal`, or `None` when incomparable.
fn compare(cell: Option<&Value>, literal: &str) -> Option<Ordering> {
    match cell? {
        Value::String(s) => Some(s.as_str().cmp(literal)),
        Value::Number(n) => n.as_f64()?.partial_cmp(&to_number(literal)),
        Value::Bool(b) => bool_to_number(*b).partial_cmp(&to_number(literal)),
        Value::Null => 0.0_f64.partial_cmp(&to_number(literal)),
        other => Some(value_to_text(other).as_str().cmp(literal)),
    }
}

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// String to number conversion: blank is 0, anything unparsable is NaN.
fn to_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&text[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust also accepts "inf" and "nan" spellings, which are not numbers here
    if text.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }

    text.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Row> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn run(query: &str, data: Value) -> QueryResult {
        evaluate(&parse(query), &rows(data))
    }

    #[test]
    fn test_select_star_returns_rows_unchanged() {
        let result = run("SELECT * FROM t", json!([{"a": 1, "b": 2}]));
        assert_eq!(result.columns, vec!["a", "b"]);
        assert_eq!(result.rows, rows(json!([{"a": 1, "b": 2}])));
    }

    #[test]
    fn test_select_with_equality() {
        let result = run("SELECT a FROM t WHERE a = 1", json!([{"a": 1}, {"a": 2}]));
        assert_eq!(result.columns, vec!["a"]);
        assert_eq!(result.rows, rows(json!([{"a": 1}])));
    }

    #[test]
    fn test_passthrough_without_keywords() {
        let data = json!([{"x": 1, "y": 2}, {"x": 3, "y": 4}]);
        let result = run("give me everything", data.clone());
        assert_eq!(result.columns, vec!["x", "y"]);
        assert_eq!(result.rows, rows(data));
    }

    #[test]
    fn test_passthrough_on_empty_rows() {
        let result = evaluate(&ParsedQuery::Passthrough, &[]);
        assert!(result.rows.is_empty());
        assert!(result.columns.is_empty());
    }

    #[test]
    fn test_equality_strips_single_quotes() {
        let data = json!([
            {"name": "Ada", "dept": "Engineering"},
            {"name": "Grace", "dept": "Sales"}
        ]);
        let result = run("SELECT name FROM t WHERE dept = 'Engineering'", data);
        assert_eq!(result.rows, rows(json!([{"name": "Ada"}])));
    }

    #[test]
    fn test_equality_coerces_csv_strings_and_numbers() {
        // CSV cells are strings; `= 5` compares text to text
        let result = run("SELECT * FROM t WHERE n = 5", json!([{"n": "5"}, {"n": "05"}]));
        assert_eq!(result.row_count(), 1);

        // JSON numbers compare numerically
        let result = run("SELECT * FROM t WHERE n = '5.0'", json!([{"n": 5}, {"n": 6}]));
        assert_eq!(result.rows, rows(json!([{"n": 5}])));

        let result = run("SELECT * FROM t WHERE ok = 1", json!([{"ok": true}, {"ok": false}]));
        assert_eq!(result.rows, rows(json!([{"ok": true}])));
    }

    #[test]
    fn test_equality_never_matches_null_or_missing() {
        let result = run(
            "SELECT * FROM t WHERE a = null",
            json!([{"a": null}, {"b": 1}]),
        );
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_greater_than_numbers() {
        let data = json!([{"age": 25}, {"age": 40}, {"age": 31}]);
        let result = run("SELECT age FROM people WHERE age > 30", data);
        assert_eq!(result.rows, rows(json!([{"age": 40}, {"age": 31}])));
    }

    #[test]
    fn test_less_than_compares_strings_lexicographically() {
        // "100" < "25" as text
        let data = json!([{"n": "100"}, {"n": "30"}]);
        let result = run("SELECT n FROM t WHERE n < 25", data);
        assert_eq!(result.rows, rows(json!([{"n": "100"}])));
    }

    #[test]
    fn test_comparison_with_non_numeric_value_is_false() {
        let result = run("SELECT * FROM t WHERE n > abc", json!([{"n": 1}, {"n": 2}]));
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_null_compares_as_zero() {
        let result = run("SELECT * FROM t WHERE n < 1", json!([{"n": null}, {"m": 0}]));
        assert_eq!(result.rows.len(), 1);
        assert!(result.rows[0]["n"].is_null());
    }

    #[test]
    fn test_unsupported_operator_passes_every_row() {
        let data = json!([{"a": 1}, {"a": 2}, {"a": 3}]);
        let result = run("SELECT a FROM t WHERE a >= 3", data);
        assert_eq!(result.row_count(), 3);
    }

    #[test]
    fn test_projection_leaves_missing_columns_absent() {
        let data = json!([{"a": 1, "b": 2}, {"a": 3}]);
        let result = run("SELECT b, zzz FROM t", data);
        assert_eq!(result.columns, vec!["b", "zzz"]);
        assert_eq!(result.rows[0], rows(json!([{"b": 2}]))[0]);
        assert!(result.rows[1].is_empty());
    }

    #[test]
    fn test_projection_follows_selection_order() {
        let result = run("SELECT b, a FROM t", json!([{"a": 1, "b": 2}]));
        let keys: Vec<&String> = result.rows[0].keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_select_star_uses_first_row_keys() {
        let result = run("SELECT * FROM t", json!([{"a": 1}, {"a": 2, "extra": 3}]));
        assert_eq!(result.columns, vec!["a"]);
        assert!(!result.rows[1].contains_key("extra"));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(""), 0.0);
        assert_eq!(to_number("  42 "), 42.0);
        assert_eq!(to_number("1e3"), 1000.0);
        assert_eq!(to_number("0x1F"), 31.0);
        assert_eq!(to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(to_number("inf").is_nan());
        assert!(to_number("NaN").is_nan());
        assert!(to_number("12abc").is_nan());
    }
}
