use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failure answers for the JSON routes. Every persistence or lookup failure
/// is converted into one of these at the route boundary; handlers never
/// panic over them.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing input.
    Validation(String),
    /// No record matches the requested team id.
    NotFound(String),
    /// The target row moved between the scan and the write.
    Conflict(String),
    /// The spreadsheet is unreachable and this route has no fallback.
    Storage(String),
    /// Something failed that the caller can do nothing about.
    Internal { error: String, details: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, json!({ "error": msg }))
            }
            ApiError::Conflict(msg) => {
                (StatusCode::CONFLICT, json!({ "error": msg }))
            }
            ApiError::Storage(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            ApiError::Internal { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": error, "details": details }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
