/*!
sqlrunner Command Line Interface

Runs queries against the built-in sample tables or a CSV/JSON file and prints
or exports the result.
*/

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sqlrunner::dataset::value_to_text;
use sqlrunner::export::ExportFormat;
use sqlrunner::ingest::ingest_path;
use sqlrunner::predefined::PREDEFINED_QUERIES;
use sqlrunner::query::parse;
use sqlrunner::reader::{reader_for, DataSource, QueryOutcome};
use sqlrunner::{QueryResult, VERSION};

#[derive(Parser)]
#[command(name = "sqlrunner")]
#[command(about = "Run SELECT-style queries against sample tables or CSV/JSON files")]
#[command(version = VERSION)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a query
    Exec {
        /// The query to execute
        query: String,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Execute a query read from a file
    Run {
        /// Path to a file containing the query
        #[arg(value_name = "SQL_FILE")]
        query_file: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Parse a query and show how it is interpreted (for debugging)
    Parse {
        /// The query to parse
        query: String,

        /// Output format for the parsed query
        #[arg(long, value_enum, default_value_t = ParseFormat::Pretty)]
        format: ParseFormat,
    },

    /// Load a CSV/JSON file and describe it
    Ingest {
        /// Path to a .csv or .json file
        file: PathBuf,
    },

    /// List the predefined example queries
    Queries,
}

#[derive(clap::Args)]
pub struct RunOptions {
    /// CSV or JSON file to query (default: the built-in sample tables)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ParseFormat {
    Json,
    Debug,
    Pretty,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "sqlrunner=debug"
    } else {
        "sqlrunner=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Exec { query, options } => exec(&query, &options)?,

        Commands::Run {
            query_file,
            options,
        } => {
            let query = std::fs::read_to_string(&query_file).with_context(|| {
                format!("Failed to read query file {}", query_file.display())
            })?;
            exec(&query, &options)?;
        }

        Commands::Parse { query, format } => {
            let parsed = parse(&query);
            match format {
                ParseFormat::Json => println!("{}", serde_json::to_string_pretty(&parsed)?),
                ParseFormat::Debug => println!("{:#?}", parsed),
                ParseFormat::Pretty => println!("{}", parsed),
            }
        }

        Commands::Ingest { file } => {
            let dataset = ingest_path(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            println!("File: {}", dataset.name);
            println!("Rows: {}", dataset.row_count());
            println!("Columns ({}):", dataset.columns.len());
            for column in &dataset.columns {
                println!("  {}", column);
            }
        }

        Commands::Queries => {
            for q in PREDEFINED_QUERIES {
                println!("{}\n  {}\n", q.name, q.query);
            }
        }
    }

    Ok(())
}

fn exec(query: &str, options: &RunOptions) -> anyhow::Result<()> {
    let (source, dataset) = match &options.file {
        Some(path) => {
            let dataset = ingest_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            (DataSource::File, Some(dataset))
        }
        None => (DataSource::Sample, None),
    };
    debug!("Running against {} source", source);

    let reader = reader_for(source, dataset)?;
    let QueryOutcome {
        result,
        execution_time_ms,
    } = reader.execute(query)?;

    let rendered = match options.format {
        OutputFormat::Table => render_table(&result),
        OutputFormat::Json => ExportFormat::Json.render(&result)?,
        OutputFormat::Csv => ExportFormat::Csv.render(&result)?,
    };

    match &options.output {
        Some(path) => write_output(path, &rendered)?,
        None => println!("{}", rendered),
    }

    eprintln!(
        "{} rows returned. Execution time: {:.2} ms",
        result.row_count(),
        execution_time_ms
    );
    Ok(())
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file {}", path.display()))?;
    eprintln!("Results written to: {}", path.display());
    Ok(())
}

/// Plain-text table with columns padded to their widest cell
fn render_table(result: &QueryResult) -> String {
    if result.columns.is_empty() {
        return "(no columns)".to_string();
    }

    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            result
                .columns
                .iter()
                .map(|c| row.get(c).map(value_to_text).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(&result.columns)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(cells.iter().map(|row| format_line(row)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exec_args() {
        let cli = Cli::parse_from([
            "sqlrunner",
            "exec",
            "SELECT * FROM t",
            "--file",
            "data.csv",
            "--format",
            "csv",
        ]);
        match cli.command {
            Commands::Exec { query, options } => {
                assert_eq!(query, "SELECT * FROM t");
                assert_eq!(options.file, Some(PathBuf::from("data.csv")));
                assert!(matches!(options.format, OutputFormat::Csv));
            }
            _ => panic!("expected exec"),
        }
    }

    #[test]
    fn test_run_args_with_data_file() {
        let cli = Cli::parse_from(["sqlrunner", "run", "q.sql", "--file", "data.csv"]);
        match cli.command {
            Commands::Run {
                query_file,
                options,
            } => {
                assert_eq!(query_file, PathBuf::from("q.sql"));
                assert_eq!(options.file, Some(PathBuf::from("data.csv")));
                assert!(matches!(options.format, OutputFormat::Table));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_args_without_data_file() {
        let cli = Cli::parse_from(["sqlrunner", "run", "q.sql"]);
        match cli.command {
            Commands::Run { options, .. } => assert!(options.file.is_none()),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_render_table() {
        let rows = vec![
            json!({"name": "Ada", "age": 36}).as_object().unwrap().clone(),
            json!({"name": "Grace"}).as_object().unwrap().clone(),
        ];
        let result = QueryResult::new(rows, vec!["name".into(), "age".into()]);

        assert_eq!(
            render_table(&result),
            "name  | age\n------+----\nAda   | 36\nGrace |"
        );
    }
}
