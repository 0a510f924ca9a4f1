//! Error types for the HTTP shell
//!
//! Bodies are flat JSON objects with an `error` message, plus `details` on
//! search failures.

use crate::metadata::MetadataError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Metadata lookup failed while building an aggregate (500)
    #[error("Failed to fetch movie details: {0}")]
    MovieDetails(#[source] MetadataError),

    /// Metadata search failed (500)
    #[error("Failed to fetch movie search results")]
    Search(#[source] MetadataError),

    /// Client exceeded its request quota (429)
    #[error("Too many requests, please try again later.")]
    RateLimited,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::MovieDetails(_) | ApiError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ApiError::Search(source) => json!({
                "error": self.to_string(),
                "details": source.to_string(),
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
