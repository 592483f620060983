//! Query string to [`ParsedQuery`].
//!
//! There is no grammar. The scanner finds the first occurrence of each of the
//! keywords `select`, `from` and `where` (case-insensitive, anywhere in the
//! text) and the clauses are cut out of the raw string between them.

use super::ast::{CompareOp, Filter, ParsedQuery, Projection};

const SELECT: &str = "select";
const FROM: &str = "from";
const WHERE: &str = "where";

/// Byte offsets of the keywords in a query.
///
/// Lowercasing is ASCII-only so offsets in the lowered copy are valid in the
/// original string.
#[derive(Debug, Default, PartialEq)]
struct KeywordScan {
    /// End of the first `select`
    select_end: Option<usize>,
    /// Start of the first `from`
    from_start: Option<usize>,
    /// End of the first `where`
    where_end: Option<usize>,
}

impl KeywordScan {
    fn new(query: &str) -> Self {
        let lower = query.to_ascii_lowercase();
        Self {
            select_end: lower.find(SELECT).map(|i| i + SELECT.len()),
            from_start: lower.find(FROM),
            where_end: lower.find(WHERE).map(|i| i + WHERE.len()),
        }
    }
}

/// Parse a raw query string.
pub fn parse(query: &str) -> ParsedQuery {
    let scan = KeywordScan::new(query);

    let (Some(select_end), Some(from_start)) = (scan.select_end, scan.from_start) else {
        return ParsedQuery::Passthrough;
    };

    let column_text = if from_start >= select_end {
        query[select_end..from_start].trim()
    } else {
        ""
    };

    ParsedQuery::Select {
        projection: parse_projection(column_text),
        filter: scan.where_end.and_then(|end| parse_filter(&query[end..])),
    }
}

fn parse_projection(text: &str) -> Projection {
    match text {
        "*" => Projection::All,
        "" => Projection::Columns(Vec::new()),
        _ => Projection::Columns(text.split(',').map(|c| c.trim().to_string()).collect()),
    }
}

/// `field op value` from the first three whitespace-separated tokens.
fn parse_filter(text: &str) -> Option<Filter> {
    let mut tokens = text.split_whitespace();
    let (field, op, value) = (tokens.next()?, tokens.next()?, tokens.next()?);

    Some(Filter {
        field: field.to_string(),
        op: CompareOp::from_token(op),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Projection {
        Projection::Columns(names.iter().map(|n| n.to_string()).collect())
    }

    #[test]
    fn test_keyword_scan() {
        let scan = KeywordScan::new("SELECT a FROM t WHERE a = 1");
        assert_eq!(scan.select_end, Some(6));
        assert_eq!(scan.from_start, Some(9));
        assert_eq!(scan.where_end, Some(21));

        assert_eq!(KeywordScan::new("show tables"), KeywordScan::default());
    }

    #[test]
    fn test_select_star() {
        assert_eq!(
            parse("SELECT * FROM t"),
            ParsedQuery::Select {
                projection: Projection::All,
                filter: None,
            }
        );
    }

    #[test]
    fn test_column_list_keeps_case() {
        assert_eq!(
            parse("select Name ,  City,age from people"),
            ParsedQuery::Select {
                projection: columns(&["Name", "City", "age"]),
                filter: None,
            }
        );
    }

    #[test]
    fn test_missing_keywords_is_passthrough() {
        assert_eq!(parse("show me everything"), ParsedQuery::Passthrough);
        assert_eq!(parse("SELECT a, b"), ParsedQuery::Passthrough);
        assert_eq!(parse("FROM t"), ParsedQuery::Passthrough);
        assert_eq!(parse(""), ParsedQuery::Passthrough);
    }

    #[test]
    fn test_where_filter() {
        let parsed = parse("SELECT * FROM employees WHERE department = 'Engineering' ORDER BY x");
        assert_eq!(
            parsed,
            ParsedQuery::Select {
                projection: Projection::All,
                filter: Some(Filter {
                    field: "department".into(),
                    op: CompareOp::Eq,
                    value: "'Engineering'".into(),
                }),
            }
        );
    }

    #[test]
    fn test_unknown_operator() {
        let ParsedQuery::Select { filter, .. } = parse("SELECT a FROM t WHERE a >= 3") else {
            panic!("expected select");
        };
        assert_eq!(filter.unwrap().op, CompareOp::Unsupported(">=".into()));
    }

    #[test]
    fn test_incomplete_where_has_no_filter() {
        let ParsedQuery::Select { filter, .. } = parse("SELECT a FROM t WHERE a =") else {
            panic!("expected select");
        };
        assert!(filter.is_none());
    }

    #[test]
    fn test_from_before_select_selects_nothing() {
        assert_eq!(
            parse("FROM t SELECT a"),
            ParsedQuery::Select {
                projection: Projection::Columns(Vec::new()),
                filter: None,
            }
        );
    }

    #[test]
    fn test_keywords_match_inside_identifiers() {
        // `selected_from` contains both keywords
        assert_eq!(
            parse("selected_from"),
            ParsedQuery::Select {
                projection: columns(&["ed_"]),
                filter: None,
            }
        );
    }

    #[test]
    fn test_non_ascii_text_keeps_offsets() {
        assert_eq!(
            parse("SELECT Straße FROM t WHERE Straße = 'Ärger'"),
            ParsedQuery::Select {
                projection: columns(&["Straße"]),
                filter: Some(Filter {
                    field: "Straße".into(),
                    op: CompareOp::Eq,
                    value: "'Ärger'".into(),
                }),
            }
        );
    }
}
