//! Normalized errors as HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::errors::NormalizedError;

/// Failure body shared by every endpoint:
/// `{"success": false, "error": "...", "kind": "NOT_FOUND", "path": "course_id"}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[schema(example = "NOT_FOUND")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<NormalizedError> for ErrorBody {
    fn from(err: NormalizedError) -> Self {
        Self {
            success: false,
            error: err.message,
            kind: err.kind.as_str().to_string(),
            path: err.path,
        }
    }
}

/// A normalized error carried out of a handler
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: NormalizedError,
}

impl ApiError {
    fn with_status(status: StatusCode, error: NormalizedError) -> Self {
        Self { status, error }
    }

    /// Request could not be read at all (malformed JSON, unbindable parameter)
    pub fn bad_request(error: NormalizedError) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, error)
    }
}

impl From<NormalizedError> for ApiError {
    fn from(error: NormalizedError) -> Self {
        let status = StatusCode::from_u16(error.kind.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::from(self.error))).into_response()
    }
}
