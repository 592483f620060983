/*!
sqlrunner REST API Server

Provides HTTP endpoints for uploading CSV/JSON files into a session and
running queries against them or against the built-in sample tables.

## Usage

```bash
sqlrunner-rest --host 127.0.0.1 --port 3335
```

## Endpoints

- `POST   /api/v1/sessions` - Create a session
- `GET    /api/v1/sessions/:id` - Session summary
- `DELETE /api/v1/sessions/:id` - Delete a session
- `POST   /api/v1/sessions/:id/upload?filename=NAME` - Upload a CSV/JSON file (raw body)
- `DELETE /api/v1/sessions/:id/dataset` - Drop the uploaded file
- `GET    /api/v1/sessions/:id/history` - Query history, most recent first
- `GET    /api/v1/sessions/:id/saved` - Saved queries
- `POST   /api/v1/sessions/:id/saved` - Save a named query
- `POST   /api/v1/query` - Run a query (returns rows and columns)
- `POST   /api/v1/parse` - Show how a query is interpreted
- `POST   /api/v1/export` - Run a query and download the result as CSV or JSON
- `GET    /api/v1/queries` - Predefined example queries
- `GET    /api/v1/health` - Health check
- `GET    /api/v1/version` - Version information
*/

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sqlrunner::export::ExportFormat;
use sqlrunner::ingest::{ingest_bytes, ingest_path};
use sqlrunner::predefined::{PredefinedQuery, PREDEFINED_QUERIES};
use sqlrunner::query::{parse, ParsedQuery};
use sqlrunner::reader::{reader_for, DataSource, QueryOutcome};
use sqlrunner::session::{HistoryEntry, SavedQuery, SessionManager};
use sqlrunner::{Dataset, Row, SqlRunnerError, VERSION};

/// CLI arguments for the REST API server
#[derive(Parser)]
#[command(name = "sqlrunner-rest")]
#[command(about = "sqlrunner REST API Server")]
#[command(version = VERSION)]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind to
    #[arg(long, default_value = "3335")]
    port: u16,

    /// CORS allowed origins (comma-separated)
    #[arg(long, default_value = "*")]
    cors_origin: String,

    /// Maximum rows returned by /api/v1/query (0 = unlimited)
    #[arg(long, default_value = "10000")]
    max_rows: usize,

    /// Minutes of inactivity before a session is dropped
    #[arg(long, default_value = "30")]
    session_timeout: u64,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "100")]
    max_upload_mb: usize,

    /// CSV or JSON file every new session starts with
    #[arg(long = "load-data")]
    load_data: Option<PathBuf>,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    sessions: Arc<SessionManager>,

    /// Dataset copied into each new session
    initial_dataset: Option<Arc<Dataset>>,

    /// Maximum rows returned by the query endpoint (0 = unlimited)
    max_rows: usize,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for /api/v1/query and /api/v1/export
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    /// Query to run
    query: String,
    /// Data source (optional, default: sample)
    #[serde(default)]
    source: DataSource,
    /// Session whose uploaded file is queried and whose history is updated
    #[serde(default)]
    session_id: Option<String>,
    /// Export format (export endpoint only, default: csv)
    #[serde(default = "default_export_format")]
    format: ExportFormat,
}

fn default_export_format() -> ExportFormat {
    ExportFormat::Csv
}

/// Request body for /api/v1/parse
#[derive(Debug, Deserialize)]
struct ParseRequest {
    query: String,
}

/// Query string of the upload endpoint
#[derive(Debug, Deserialize)]
struct UploadParams {
    filename: String,
}

/// Request body for saving a query
#[derive(Debug, Deserialize)]
struct SaveRequest {
    name: String,
    query: String,
}

/// Successful API response
#[derive(Debug, Serialize)]
struct ApiSuccess<T> {
    status: String,
    data: T,
}

fn success<T>(data: T) -> Json<ApiSuccess<T>> {
    Json(ApiSuccess {
        status: "success".to_string(),
        data,
    })
}

/// Error API response
#[derive(Debug, Serialize)]
struct ApiError {
    status: String,
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

/// Query execution result data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    /// Array of row objects
    rows: Vec<Row>,
    /// Column names
    columns: Vec<String>,
    /// Total row count before truncation
    row_count: usize,
    /// Whether results were truncated due to row limit
    truncated: bool,
    execution_time_ms: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCreated {
    session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DatasetSummary {
    name: String,
    row_count: usize,
    columns: Vec<String>,
}

impl From<&Dataset> for DatasetSummary {
    fn from(dataset: &Dataset) -> Self {
        Self {
            name: dataset.name.clone(),
            row_count: dataset.row_count(),
            columns: dataset.columns.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionSummary {
    session_id: String,
    dataset: Option<DatasetSummary>,
    history_count: usize,
    saved_count: usize,
}

#[derive(Debug, Serialize)]
struct Removed {
    removed: bool,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    sessions: usize,
}

/// Version response
#[derive(Debug, Serialize)]
struct VersionResponse {
    version: String,
    features: Vec<String>,
}

// ============================================================================
// Error Handling
// ============================================================================

/// Custom error type for API responses
struct ApiErrorResponse {
    status: StatusCode,
    error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let json = Json(self.error);
        (self.status, json).into_response()
    }
}

impl From<SqlRunnerError> for ApiErrorResponse {
    fn from(err: SqlRunnerError) -> Self {
        let status = match &err {
            SqlRunnerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            SqlRunnerError::IoError(_) | SqlRunnerError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            warn!("Request failed: {}", err);
        }

        ApiErrorResponse {
            status,
            error: ApiError {
                status: "error".to_string(),
                error: ErrorDetails {
                    message: err.to_string(),
                    error_type: err.kind().to_string(),
                },
            },
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Run a request's query against its data source, recording session history.
fn run_query(state: &AppState, request: &QueryRequest) -> Result<QueryOutcome, SqlRunnerError> {
    let dataset = match (request.source, request.session_id.as_deref()) {
        (DataSource::File, Some(id)) => state.sessions.dataset(id)?,
        _ => None,
    };

    let reader = reader_for(request.source, dataset)?;
    let outcome = reader.execute(&request.query)?;

    if let Some(id) = request.session_id.as_deref() {
        state.sessions.record_history(id, &request.query)?;
    }

    Ok(outcome)
}

/// Periodically drop sessions that have been idle past the timeout.
fn spawn_session_sweeper(sessions: Arc<SessionManager>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            match sessions.remove_expired() {
                Ok(0) => {}
                Ok(n) => info!("Removed {} expired session(s)", n),
                Err(e) => warn!("Session cleanup failed: {}", e),
            }
        }
    });
}

// ============================================================================
// Handler Functions
// ============================================================================

/// POST /api/v1/sessions - Create a session
async fn create_session_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<SessionCreated>>, ApiErrorResponse> {
    let session_id = state.sessions.create_session()?;
    if let Some(dataset) = &state.initial_dataset {
        state
            .sessions
            .replace_dataset(&session_id, dataset.as_ref().clone())?;
    }

    info!("Created session {}", session_id);
    Ok(success(SessionCreated { session_id }))
}

/// GET /api/v1/sessions/:id - Session summary
async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<SessionSummary>>, ApiErrorResponse> {
    let session = state.sessions.get_session(&id)?;
    Ok(success(SessionSummary {
        session_id: session.id,
        dataset: session.dataset.as_ref().map(DatasetSummary::from),
        history_count: session.history.len(),
        saved_count: session.saved.len(),
    }))
}

/// DELETE /api/v1/sessions/:id - Delete a session
async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<Removed>>, ApiErrorResponse> {
    if !state.sessions.delete_session(&id)? {
        return Err(SqlRunnerError::SessionNotFound(id).into());
    }
    info!("Deleted session {}", id);
    Ok(success(Removed { removed: true }))
}

/// POST /api/v1/sessions/:id/upload - Ingest an uploaded file
async fn upload_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<ApiSuccess<DatasetSummary>>, ApiErrorResponse> {
    if !state.sessions.session_exists(&id)? {
        return Err(SqlRunnerError::SessionNotFound(id).into());
    }

    info!(
        "Uploading '{}' ({} bytes) into session {}",
        params.filename,
        body.len(),
        id
    );

    let filename = params.filename;
    let dataset = tokio::task::spawn_blocking(move || ingest_bytes(&filename, &body))
        .await
        .map_err(|e| SqlRunnerError::InternalError(format!("Ingestion task failed: {}", e)))??;

    let summary = DatasetSummary::from(&dataset);
    state.sessions.replace_dataset(&id, dataset)?;
    Ok(success(summary))
}

/// DELETE /api/v1/sessions/:id/dataset - Drop the uploaded file
async fn clear_dataset_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<Removed>>, ApiErrorResponse> {
    let removed = state.sessions.clear_dataset(&id)?;
    Ok(success(Removed { removed }))
}

/// GET /api/v1/sessions/:id/history
async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<Vec<HistoryEntry>>>, ApiErrorResponse> {
    Ok(success(state.sessions.history(&id)?))
}

/// GET /api/v1/sessions/:id/saved
async fn list_saved_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<Vec<SavedQuery>>>, ApiErrorResponse> {
    Ok(success(state.sessions.saved_queries(&id)?))
}

/// POST /api/v1/sessions/:id/saved
async fn save_query_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<ApiSuccess<Vec<SavedQuery>>>, ApiErrorResponse> {
    state
        .sessions
        .save_query(&id, &request.name, &request.query)?;
    Ok(success(state.sessions.saved_queries(&id)?))
}

/// POST /api/v1/query - Run a query
async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ApiSuccess<QueryResponse>>, ApiErrorResponse> {
    info!(
        "Executing query: {} chars against {} source",
        request.query.len(),
        request.source
    );

    let QueryOutcome {
        mut result,
        execution_time_ms,
    } = run_query(&state, &request)?;

    let (row_count, truncated) = result.limit_rows(state.max_rows);
    if truncated {
        info!("Truncating results from {} to {} rows", row_count, state.max_rows);
    }

    Ok(success(QueryResponse {
        rows: result.rows,
        columns: result.columns,
        row_count,
        truncated,
        execution_time_ms,
    }))
}

/// POST /api/v1/parse - Show how a query is interpreted
async fn parse_handler(Json(request): Json<ParseRequest>) -> Json<ApiSuccess<ParsedQuery>> {
    info!("Parsing query: {} chars", request.query.len());
    success(parse(&request.query))
}

/// POST /api/v1/export - Run a query and return the result as a file
async fn export_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Response, ApiErrorResponse> {
    let outcome = run_query(&state, &request)?;
    let format = request.format;
    let body = format.render(&outcome.result)?;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        body,
    )
        .into_response())
}

/// GET /api/v1/queries - Predefined example queries
async fn queries_handler() -> Json<ApiSuccess<&'static [PredefinedQuery]>> {
    success(PREDEFINED_QUERIES)
}

/// GET /api/v1/health - Health check
async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiErrorResponse> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        sessions: state.sessions.session_count()?,
    }))
}

/// GET /api/v1/version - Version information
async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: VERSION.to_string(),
        features: vec!["csv".to_string(), "json".to_string(), "sample".to_string()],
    })
}

/// Root handler
async fn root_handler() -> &'static str {
    "sqlrunner REST API Server - See /api/v1/health for status"
}

// ============================================================================
// Main Server
// ============================================================================

fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/v1/sessions", post(create_session_handler))
        .route(
            "/api/v1/sessions/:id",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/api/v1/sessions/:id/upload", post(upload_handler))
        .route(
            "/api/v1/sessions/:id/dataset",
            axum::routing::delete(clear_dataset_handler),
        )
        .route("/api/v1/sessions/:id/history", get(history_handler))
        .route(
            "/api/v1/sessions/:id/saved",
            get(list_saved_handler).post(save_query_handler),
        )
        .route("/api/v1/query", post(query_handler))
        .route("/api/v1/parse", post(parse_handler))
        .route("/api/v1/export", post(export_handler))
        .route("/api/v1/queries", get(queries_handler))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/version", get(version_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqlrunner=info,sqlrunner_rest=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let initial_dataset = match &cli.load_data {
        Some(path) => {
            info!("Loading {} for new sessions", path.display());
            Some(Arc::new(ingest_path(path)?))
        }
        None => None,
    };

    let sessions = Arc::new(SessionManager::new(cli.session_timeout));
    spawn_session_sweeper(sessions.clone());

    // Create application state
    let state = AppState {
        sessions,
        initial_dataset,
        max_rows: cli.max_rows,
    };

    // Configure CORS
    let cors = if cli.cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(vec![header::CONTENT_TYPE])
    } else {
        let origins: Vec<_> = cli
            .cors_origin
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(vec![header::CONTENT_TYPE])
    };

    let app = build_router(state, cli.max_upload_mb * 1024 * 1024)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;

    info!("Starting sqlrunner REST API server on {}", addr);
    info!("Sessions expire after {} minute(s) of inactivity", cli.session_timeout);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
