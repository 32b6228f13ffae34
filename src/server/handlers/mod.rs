//! HTTP handlers for the server.

pub mod documents;
pub mod scan;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::ReelprintError;

/// Error body: `{"success": false, "error": "..."}`.
///
/// Bad input maps to 400, everything else to 500.
pub struct ApiError(pub ReelprintError);

impl From<ReelprintError> for ApiError {
    fn from(e: ReelprintError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }
        (status, Json(json!({ "success": false, "error": self.0.to_string() }))).into_response()
    }
}

/// Run CPU-bound work off the async runtime.
pub async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ReelprintError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError(ReelprintError::Generation(format!("Task error: {}", e))))?
        .map_err(ApiError)
}
