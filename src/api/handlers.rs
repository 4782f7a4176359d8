//! API request handlers
//!
//! Handlers for all REST API endpoints. Reader calls do blocking file I/O
//! and run on the blocking thread pool.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use super::server::AppState;
use crate::error::{ExdError, ExdResult};
use crate::reader::ExternalDataReader;
use crate::types::{Handle, Identifier, StructureRequest, ValuesExRequest, ValuesRequest};

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
            code: Some(code.into()),
        }
    }

    pub fn from_error(err: &ExdError) -> Self {
        Self::err(err.code(), err.to_string())
    }
}

/// HTTP status for a reader error.
pub fn status_for(err: &ExdError) -> StatusCode {
    match err {
        ExdError::NotFound(_) => StatusCode::NOT_FOUND,
        ExdError::OutOfRange(_) | ExdError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        ExdError::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
        ExdError::TypeInference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ExdError::Io(_) | ExdError::Workbook(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

async fn run_blocking<T, F>(state: &AppState, op: F) -> Reply<T>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&ExternalDataReader) -> ExdResult<T> + Send + 'static,
{
    let reader = Arc::clone(&state.reader);
    match tokio::task::spawn_blocking(move || op(&reader)).await {
        Ok(Ok(data)) => (StatusCode::OK, Json(ApiResponse::ok(data))),
        Ok(Err(e)) => {
            warn!(code = e.code(), "request failed: {}", e);
            (status_for(&e), Json(ApiResponse::from_error(&e)))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err("INTERNAL", format!("worker failed: {}", e))),
        ),
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "exd API Server".to_string(),
        version: state.version.clone(),
        description: "Spreadsheet files as groups and typed channels".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new("/api/v1/open", "POST", "Open a file and get a handle"),
            EndpointInfo::new("/api/v1/close", "POST", "Release a handle"),
            EndpointInfo::new("/api/v1/structure", "POST", "Group/channel hierarchy of a file"),
            EndpointInfo::new("/api/v1/values", "POST", "Typed values of selected channels"),
            EndpointInfo::new("/api/v1/values_ex", "POST", "Virtual channel access (not supported)"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub open_sessions: usize,
    pub open_handles: usize,
}

/// GET /health - Health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = state.reader.registry();
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        open_sessions: registry.session_count(),
        open_handles: registry.handle_count(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: ["open", "close", "structure", "values"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }))
}

/// Close response
#[derive(Serialize)]
pub struct CloseResponse {
    pub closed: bool,
    pub handle: Handle,
}

/// POST /api/v1/open - Open a file
pub async fn open(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Identifier>,
) -> impl IntoResponse {
    run_blocking(&state, move |reader| reader.open(&req)).await
}

/// POST /api/v1/close - Release a handle
pub async fn close(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Handle>,
) -> impl IntoResponse {
    run_blocking(&state, move |reader| {
        reader.close(&req)?;
        Ok(CloseResponse {
            closed: true,
            handle: req,
        })
    })
    .await
}

/// POST /api/v1/structure - File structure
pub async fn structure(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StructureRequest>,
) -> impl IntoResponse {
    run_blocking(&state, move |reader| reader.get_structure(&req)).await
}

/// POST /api/v1/values - Channel values
pub async fn values(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValuesRequest>,
) -> impl IntoResponse {
    run_blocking(&state, move |reader| reader.get_values(&req)).await
}

/// POST /api/v1/values_ex - Virtual channel values
pub async fn values_ex(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValuesExRequest>,
) -> impl IntoResponse {
    run_blocking(&state, move |reader| reader.get_values_ex(&req)).await
}
