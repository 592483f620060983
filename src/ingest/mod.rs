//! File ingestion: CSV or JSON bytes to a [`Dataset`].
//!
//! The format is chosen from the file name extension. Both paths produce a
//! list of rows and a column list taken from the keys of the first row.
//!
//! ```rust
//! use sqlrunner::ingest::ingest_bytes;
//!
//! let dataset = ingest_bytes("items.json", br#"{"items":[{"x":1}]}"#).unwrap();
//! assert_eq!(dataset.columns, vec!["x"]);
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::{Dataset, Result, SqlRunnerError};

pub mod csv;
pub mod json;

/// Files are read in slices of this size.
pub const CHUNK_SIZE: usize = 20 * 1024 * 1024;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    /// Detect the format from a file name, e.g. `sales.CSV` -> `Csv`
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            "" => Err(SqlRunnerError::UnsupportedFormat(format!(
                "'{}' has no file extension",
                name
            ))),
            other => Err(SqlRunnerError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Ingest a file from disk.
pub fn ingest_path(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    // Reject the extension before touching the file
    let format = FileFormat::from_file_name(&name)?;
    let bytes = read_chunked(path)?;
    ingest_text(format, &name, &decode(bytes)?)
}

/// Ingest an in-memory upload. `file_name` only selects the format and names
/// the dataset.
pub fn ingest_bytes(file_name: &str, bytes: &[u8]) -> Result<Dataset> {
    let format = FileFormat::from_file_name(file_name)?;
    ingest_text(format, file_name, &decode(bytes.to_vec())?)
}

/// Ingest already-decoded text in the given format.
pub fn ingest_text(format: FileFormat, name: &str, text: &str) -> Result<Dataset> {
    let (rows, columns) = match format {
        FileFormat::Csv => csv::parse_csv(text)?,
        FileFormat::Json => json::parse_json(text)?,
    };

    info!(
        "Ingested '{}' ({:?}): {} rows, {} columns",
        name,
        format,
        rows.len(),
        columns.len()
    );

    Ok(Dataset::new(name, rows, columns))
}

/// Read a whole file in `CHUNK_SIZE` slices, logging progress per slice.
fn read_chunked(path: &Path) -> Result<Vec<u8>> {
    read_chunked_with(path, CHUNK_SIZE)
}

fn read_chunked_with(path: &Path, chunk_size: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let total = file.metadata()?.len() as usize;
    let mut content = Vec::with_capacity(total);

    loop {
        let read = (&mut file)
            .take(chunk_size as u64)
            .read_to_end(&mut content)?;
        if read == 0 {
            break;
        }
        if total > 0 {
            debug!(
                "Read {} of {} bytes ({}%)",
                content.len(),
                total,
                (content.len() * 100 / total).min(100)
            );
        }
    }

    Ok(content)
}

fn decode(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| SqlRunnerError::MalformedInput(format!("File is not valid UTF-8: {}", e)))
}
