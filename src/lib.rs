/*!
# sqlrunner - SELECT-style queries over sample tables and uploaded files

sqlrunner loads a CSV or JSON file into an in-memory [`Dataset`] and runs a
deliberately small query language against it:

```sql
SELECT name, city FROM people WHERE age > 30
```

Only a column list (or `*`) and at most one `field op value` comparison are
understood. Queries without both `SELECT` and `FROM` return the whole
dataset. A built-in set of sample tables can be queried the same way through
[`reader::SampleReader`].

## Example

```rust
use sqlrunner::ingest::ingest_bytes;
use sqlrunner::reader::{FileReader, Reader};

let dataset = ingest_bytes("people.csv", b"name,age\nAda,36\nLinus,28\n").unwrap();
let reader = FileReader::new(dataset);
let outcome = reader.execute("SELECT name FROM people WHERE age > 30").unwrap();

assert_eq!(outcome.result.columns, vec!["name"]);
assert_eq!(outcome.result.rows.len(), 1);
```
*/

pub mod dataset;
pub mod export;
pub mod ingest;
pub mod predefined;
pub mod query;
pub mod reader;
pub mod session;

pub use dataset::{Dataset, QueryResult, Row};

/// Version of the sqlrunner library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main error type for sqlrunner operations
#[derive(Debug, thiserror::Error)]
pub enum SqlRunnerError {
    #[error("Unsupported file format: {0}. Please upload a JSON or CSV file.")]
    UnsupportedFormat(String),

    #[error("JSON file must contain an array of objects")]
    NoArrayFound,

    #[error("File contains no data: {0}")]
    EmptyFile(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("No file loaded. Upload a CSV or JSON file before querying it.")]
    NoDataSource,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SqlRunnerError {
    /// Short label used when reporting the error to a client
    pub fn kind(&self) -> &'static str {
        match self {
            SqlRunnerError::UnsupportedFormat(_) => "UnsupportedFormat",
            SqlRunnerError::NoArrayFound => "NoArrayFound",
            SqlRunnerError::EmptyFile(_) => "EmptyFile",
            SqlRunnerError::MalformedInput(_) => "MalformedInput",
            SqlRunnerError::NoDataSource => "NoDataSource",
            SqlRunnerError::ValidationError(_) => "ValidationError",
            SqlRunnerError::SessionNotFound(_) => "SessionNotFound",
            SqlRunnerError::IoError(_) => "IoError",
            SqlRunnerError::InternalError(_) => "InternalError",
        }
    }
}

pub type Result<T> = std::result::Result<T, SqlRunnerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(SqlRunnerError::NoArrayFound.kind(), "NoArrayFound");
        assert_eq!(
            SqlRunnerError::UnsupportedFormat("txt".into()).kind(),
            "UnsupportedFormat"
        );
        assert_eq!(SqlRunnerError::NoDataSource.kind(), "NoDataSource");
    }

    #[test]
    fn test_error_messages_are_readable() {
        let err = SqlRunnerError::UnsupportedFormat("xlsx".into());
        assert!(err.to_string().contains("xlsx"));
        assert!(err.to_string().contains("JSON or CSV"));

        let err = SqlRunnerError::EmptyFile("No data rows found in the file".into());
        assert!(err.to_string().contains("No data rows"));
    }
}
