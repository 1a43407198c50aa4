//! # groupsheet-server
//!
//! HTTP upload/download surface for the group-sheet transform.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use groupsheet_core::{append_group_sheet, enriched_file_name, GroupError};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Response header carrying the number of diagnostics raised by the transform.
pub static WARNINGS_HEADER: HeaderName = HeaderName::from_static("x-groupsheet-warnings");

#[derive(Parser)]
#[command(name = "groupsheet-server")]
#[command(author, version, about = "HTTP server for the group-sheet transform", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: String,

    /// Maximum accepted upload size in megabytes
    #[arg(long, default_value_t = 25)]
    max_upload_mb: usize,
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Query string of `POST /enrich`.
#[derive(Debug, Deserialize)]
pub struct EnrichParams {
    #[serde(default = "default_months")]
    pub months: u32,
    /// Name of the uploaded file, used to derive the download name.
    pub filename: Option<String>,
}

fn default_months() -> u32 {
    groupsheet_core::Months::default().get()
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_sheets: Vec<String>,
}

/// Failure of an enrich request.
#[derive(Debug)]
pub enum ApiError {
    Group(GroupError),
    Internal(String),
}

impl From<GroupError> for ApiError {
    fn from(err: GroupError) -> Self {
        Self::Group(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Group(GroupError::MissingSheets { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "missing_sheets")
            }
            Self::Group(GroupError::InvalidMonths(_)) => (StatusCode::BAD_REQUEST, "invalid_months"),
            Self::Group(GroupError::Parse(_)) => (StatusCode::BAD_REQUEST, "unreadable_workbook"),
            Self::Group(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "processing_failed")
            }
        };

        let (message, missing_sheets) = match &self {
            Self::Group(err) => (
                err.to_string(),
                err.missing_sheets().map(<[String]>::to_vec).unwrap_or_default(),
            ),
            Self::Internal(message) => (message.clone(), Vec::new()),
        };

        if status.is_server_error() {
            error!(%message, "enrich request failed");
        } else {
            warn!(%message, "enrich request rejected");
        }

        let body = ErrorBody {
            error: code.to_string(),
            message,
            missing_sheets,
        };
        (status, Json(body)).into_response()
    }
}

/// Header-safe download name for an uploaded file.
fn download_name(filename: Option<&str>) -> String {
    let name = enriched_file_name(filename.unwrap_or_default());
    name.chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
        .collect()
}

/// Enrich the uploaded workbook and return it as a download.
pub async fn enrich(
    Query(params): Query<EnrichParams>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let filename = download_name(params.filename.as_deref());
    let months = params.months;
    info!(bytes = body.len(), months, %filename, "enrich request");

    let enrichment = tokio::task::spawn_blocking(move || append_group_sheet(&body, months))
        .await
        .map_err(|e| ApiError::Internal(format!("transform task failed: {e}")))??;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (
            WARNINGS_HEADER.clone(),
            enrichment.diagnostics.len().to_string(),
        ),
    ];
    Ok((StatusCode::OK, headers, enrichment.bytes).into_response())
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/enrich", post(enrich))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = create_router(args.max_upload_mb.saturating_mul(1024 * 1024));

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!(addr = %args.bind, "groupsheet-server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
