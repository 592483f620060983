//! Filter/project interpreter for file-backed queries.
//!
//! Understands `SELECT <columns|*> FROM <anything> [WHERE <field> <op> <value>]`
//! and nothing else: no aliases, functions, ordering, grouping or joins.
//! Anything without both `SELECT` and `FROM` returns the full row set.

use tracing::debug;

use crate::{QueryResult, Row};

pub mod ast;
mod eval;
mod parser;

pub use ast::{CompareOp, Filter, ParsedQuery, Projection};
pub use eval::evaluate;
pub use parser::parse;

/// Parse `query` and evaluate it over `rows`.
pub fn run(query: &str, rows: &[Row]) -> QueryResult {
    let parsed = parse(query);
    debug!("Parsed query: {}", parsed);
    let result = evaluate(&parsed, rows);
    debug!(
        "Query returned {} of {} rows",
        result.row_count(),
        rows.len()
    );
    result
}
