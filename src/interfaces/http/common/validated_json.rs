//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but also runs
//! `validator::Validate::validate()` on the deserialized value. Failures are
//! answered with the same normalized error body every other endpoint uses.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ApiError;
use crate::application::errors::{ErrorNormalizer, NormalizedError};
use crate::support::errors::{DomainError, ErrorKind};

/// An extractor that deserializes JSON and validates it.
///
/// ```ignore
/// async fn create_review(ValidatedJson(body): ValidatedJson<NewReview>) {
///     // `body` passed its structural constraints
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    /// Body missing, not JSON, or not the expected shape
    JsonError(JsonRejection),
    /// Structural constraints violated
    ValidationError(validator::ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(rejection) => ApiError::bad_request(NormalizedError {
                kind: ErrorKind::ValidationFailed,
                message: format!("Invalid JSON: {}", rejection.body_text()),
                path: None,
            })
            .into_response(),
            Self::ValidationError(errors) => {
                let normalized = ErrorNormalizer::new().normalize(&DomainError::from(errors));
                ApiError::from(normalized).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────
