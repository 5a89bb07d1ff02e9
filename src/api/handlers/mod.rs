use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::export;
use crate::models::{BackupInfo, Document, DocumentPatch};
use crate::store::{merge, Store, StoreError};

// ============================================================
// Error Handling
// ============================================================

/// Failure envelope returned for every non-2xx response: a machine-readable
/// error kind plus a human-readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Store failures mapped to an HTTP status and response body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match &e {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Parse(_) => StatusCode::BAD_REQUEST,
            StoreError::Io(_) | StoreError::CorruptSnapshot { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            error: self.kind.to_string(),
            message: self.message,
            timestamp: Utc::now(),
        };
        (self.status, Json(body)).into_response()
    }
}

// ============================================================
// Connectivity
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct TestResponse {
    pub status: String,
    pub message: String,
    pub server_version: String,
    pub data_dir_writable: bool,
    pub backup_dir_writable: bool,
    pub timestamp: DateTime<Utc>,
}

pub async fn test_connection(State(store): State<Store>) -> Json<TestResponse> {
    let health = store.health();
    Json(TestResponse {
        status: "success".to_string(),
        message: "server is reachable".to_string(),
        server_version: env!("CARGO_PKG_VERSION").to_string(),
        data_dir_writable: health.data_dir_writable,
        backup_dir_writable: health.backup_dir_writable,
        timestamp: Utc::now(),
    })
}

// ============================================================
// Document
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadResponse {
    pub status: String,
    pub data: Document,
    pub timestamp: DateTime<Utc>,
}

pub async fn load_document(State(store): State<Store>) -> Json<LoadResponse> {
    Json(LoadResponse {
        status: "success".to_string(),
        data: store.load(),
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    pub message: String,
    pub books_count: usize,
    pub timestamp: DateTime<Utc>,
}

pub async fn save_document(
    State(store): State<Store>,
    Json(patch): Json<DocumentPatch>,
) -> Result<Json<SaveResponse>, ApiError> {
    let mut doc = store.load();
    merge::apply_patch(&mut doc, patch);
    store.save(&mut doc)?;

    Ok(Json(SaveResponse {
        status: "success".to_string(),
        message: "document saved".to_string(),
        books_count: doc.books.len(),
        timestamp: Utc::now(),
    }))
}

// ============================================================
// Backups
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupCreatedResponse {
    pub status: String,
    pub message: String,
    pub filename: String,
    pub size: u64,
    pub timestamp: DateTime<Utc>,
}

pub async fn create_backup(
    State(store): State<Store>,
) -> Result<Json<BackupCreatedResponse>, ApiError> {
    let backup = store.create_backup()?;

    Ok(Json(BackupCreatedResponse {
        status: "success".to_string(),
        message: "backup created".to_string(),
        filename: backup.filename,
        size: backup.size,
        timestamp: Utc::now(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupListResponse {
    pub status: String,
    pub backups: Vec<BackupInfo>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

pub async fn list_backups(
    State(store): State<Store>,
) -> Result<Json<BackupListResponse>, ApiError> {
    let backups = store.list_backups()?;

    Ok(Json(BackupListResponse {
        status: "success".to_string(),
        count: backups.len(),
        backups,
        timestamp: Utc::now(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub status: String,
    pub message: String,
    pub filename: String,
    pub books_count: usize,
    pub timestamp: DateTime<Utc>,
}

pub async fn restore_backup(
    State(store): State<Store>,
    Json(request): Json<RestoreRequest>,
) -> Result<Json<RestoreResponse>, ApiError> {
    let doc = store.restore(&request.filename)?;

    Ok(Json(RestoreResponse {
        status: "success".to_string(),
        message: "backup restored".to_string(),
        filename: request.filename,
        books_count: doc.books.len(),
        timestamp: Utc::now(),
    }))
}

// ============================================================
// Export
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// `json` (default) or `csv`.
    pub format: Option<String>,
}

pub async fn export_document(
    State(store): State<Store>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let doc = store.load();
    let date = Utc::now().format("%Y-%m-%d");

    match query.format.as_deref().unwrap_or("json") {
        "json" => {
            let body = serde_json::to_string_pretty(&doc).map_err(StoreError::from)?;
            Ok(attachment(
                "application/json",
                &format!("books_{date}.json"),
                body,
            ))
        }
        "csv" => Ok(attachment(
            "text/csv; charset=utf-8",
            &format!("books_{date}.csv"),
            export::books_to_csv(&doc.books),
        )),
        other => Err(ApiError::bad_request(
            "unknown_format",
            format!("unknown export format: {other}"),
        )),
    }
}

fn attachment(content_type: &'static str, filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
