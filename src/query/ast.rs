//! Query AST types

use serde::Serialize;

/// Structured reading of one raw query string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedQuery {
    /// No `SELECT ... FROM`: every row and every first-row column is returned
    Passthrough,
    Select {
        projection: Projection,
        filter: Option<Filter>,
    },
}

/// Which columns a query selects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// `SELECT *`: the keys of the first row
    All,
    /// Named columns in selection order. Names are not checked against the data.
    Columns(Vec<String>),
}

/// Single `field operator value` comparison from a WHERE clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub field: String,
    pub op: CompareOp,
    /// Value token exactly as written (quotes included)
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
    /// Any other operator token. Such a filter lets every row through.
    Unsupported(String),
}

impl CompareOp {
    pub fn from_token(token: &str) -> Self {
        match token {
            "=" => CompareOp::Eq,
            ">" => CompareOp::Gt,
            "<" => CompareOp::Lt,
            other => CompareOp::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Unsupported(token) => token,
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParsedQuery::Passthrough => write!(f, "passthrough (all rows, all columns)"),
            ParsedQuery::Select { projection, filter } => {
                match projection {
                    Projection::All => write!(f, "select *")?,
                    Projection::Columns(columns) => write!(f, "select [{}]", columns.join(", "))?,
                }
                if let Some(filter) = filter {
                    write!(f, " where {} {} {}", filter.field, filter.op, filter.value)?;
                }
                Ok(())
            }
        }
    }
}
