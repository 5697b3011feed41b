//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use downstream::DownstreamError;
use orchestrator::BatchError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// A downstream call failed after retries.
    Downstream(DownstreamError),
    /// A review batch could not be committed.
    Batch(BatchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Downstream(err) => downstream_error_to_response(err),
            ApiError::Batch(err) => batch_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn downstream_error_to_response(err: DownstreamError) -> (StatusCode, String) {
    tracing::error!(error = %err, "downstream call failed");
    match err {
        DownstreamError::Client {
            status, message, ..
        } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
            message,
        ),
        DownstreamError::Server { message, .. } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        err @ DownstreamError::Transport { .. } => (StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

fn batch_error_to_response(err: BatchError) -> (StatusCode, String) {
    if err.is_compensation_incomplete() {
        let orphaned: Vec<&str> = err.orphaned().iter().map(|o| o.review_id.as_str()).collect();
        tracing::error!(error = %err, ?orphaned, "review batch left orphaned reviews");
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }

    tracing::warn!(error = %err, "review batch rolled back");
    if err.rejected_by_client_errors_only() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        (StatusCode::BAD_GATEWAY, err.to_string())
    }
}

impl From<DownstreamError> for ApiError {
    fn from(err: DownstreamError) -> Self {
        ApiError::Downstream(err)
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        ApiError::Batch(err)
    }
}
