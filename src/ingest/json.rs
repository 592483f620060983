//! JSON ingestion: find the row array and turn its objects into rows.

use serde_json::Value;

use crate::dataset::first_row_columns;
use crate::{Result, Row, SqlRunnerError};

/// Parse JSON text into rows and the first row's column list.
///
/// The rows come from the top-level array, or from the first property of a
/// top-level object whose value is an array.
pub fn parse_json(text: &str) -> Result<(Vec<Row>, Vec<String>)> {
    let root: Value = serde_json::from_str(text)
        .map_err(|e| SqlRunnerError::MalformedInput(format!("Error parsing JSON file: {}", e)))?;

    let items = find_row_array(root)?;
    if items.is_empty() {
        return Err(SqlRunnerError::EmptyFile("File contains no data".to_string()));
    }

    let rows = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(SqlRunnerError::MalformedInput(format!(
                "Element {} of the row array is not an object: {}",
                i, other
            ))),
        })
        .collect::<Result<Vec<Row>>>()?;

    let columns = first_row_columns(&rows);
    Ok((rows, columns))
}

fn find_row_array(root: Value) -> Result<Vec<Value>> {
    match root {
        Value::Array(items) => Ok(items),
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, value)| match value {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .ok_or(SqlRunnerError::NoArrayFound),
        _ => Err(SqlRunnerError::NoArrayFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_array() {
        let (rows, columns) = parse_json(r#"[{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]"#).unwrap();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["a"], 2);
    }

    #[test]
    fn test_nested_array_property() {
        let (rows, columns) = parse_json(r#"{"items":[{"x":1}]}"#).unwrap();
        assert_eq!(columns, vec!["x"]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["x"], 1);
    }

    #[test]
    fn test_first_array_property_wins() {
        let text = r#"{"count": 2, "first": [{"a": 1}], "second": [{"b": 2}, {"b": 3}]}"#;
        let (rows, columns) = parse_json(text).unwrap();
        assert_eq!(columns, vec!["a"]);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_no_array_found() {
        assert!(matches!(parse_json("{}").unwrap_err(), SqlRunnerError::NoArrayFound));
        assert!(matches!(
            parse_json(r#"{"x":1}"#).unwrap_err(),
            SqlRunnerError::NoArrayFound
        ));
        assert!(matches!(parse_json("42").unwrap_err(), SqlRunnerError::NoArrayFound));
        assert!(matches!(
            parse_json(r#""text""#).unwrap_err(),
            SqlRunnerError::NoArrayFound
        ));
    }

    #[test]
    fn test_empty_array() {
        assert!(matches!(parse_json("[]").unwrap_err(), SqlRunnerError::EmptyFile(_)));
        assert!(matches!(
            parse_json(r#"{"rows": []}"#).unwrap_err(),
            SqlRunnerError::EmptyFile(_)
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_json("[{\"a\": 1,").unwrap_err(),
            SqlRunnerError::MalformedInput(_)
        ));
    }

    #[test]
    fn test_non_object_elements() {
        assert!(matches!(
            parse_json("[1, 2, 3]").unwrap_err(),
            SqlRunnerError::MalformedInput(_)
        ));
    }

    #[test]
    fn test_columns_come_from_first_row_only() {
        let (rows, columns) = parse_json(r#"[{"a": 1}, {"a": 2, "extra": true}]"#).unwrap();
        assert_eq!(columns, vec!["a"]);
        assert_eq!(rows[1]["extra"], true);
    }

    #[test]
    fn test_null_values_are_kept() {
        let (rows, _) = parse_json(r#"[{"a": null, "b": 1}]"#).unwrap();
        assert!(rows[0].contains_key("a"));
        assert!(rows[0]["a"].is_null());
    }
}
