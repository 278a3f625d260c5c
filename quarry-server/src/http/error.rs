//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with the status codes and bodies
//! the search contract promises.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use quarry_search::MeiliError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Search credentials absent from the environment (500)
    SearchUnconfigured,

    /// Query parameter missing or blank (400)
    MissingQuery,

    /// Search backend failure (502 when it answered, 500 when unreachable)
    Search(MeiliError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::SearchUnconfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "MEILI_HOST and MEILI_MASTER_KEY are required"
                }),
            ),
            Self::MissingQuery => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "q is required"
                }),
            ),
            // The engine answered with a non-success status; its body text
            // passes through untouched.
            Self::Search(MeiliError::Upstream { body, .. }) => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "search_failed",
                    "details": body
                }),
            ),
            Self::Search(e) => {
                // Log the actual error, return a generic message
                tracing::error!("Search backend unreachable: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<MeiliError> for ApiError {
    fn from(e: MeiliError) -> Self {
        match e {
            MeiliError::MissingConfig => Self::SearchUnconfigured,
            _ => Self::Search(e),
        }
    }
}
