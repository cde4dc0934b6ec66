//! Maps request failures to single-line plain-text responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pochi_core::UpstreamError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest,
    MissingApiKey,
    Upstream(UpstreamError),
}

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        ApiError::Upstream(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest => (StatusCode::BAD_REQUEST, "Bad request".to_string()),
            ApiError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server API key not configured".to_string(),
            ),
            // Upstream diagnostics are passed through to the client.
            ApiError::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate response: {}", e),
            ),
        }
        .into_response()
    }
}
