use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::domain::CourseId;

/// A single structural constraint violated by an input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    /// Human-readable constraint description, e.g. "must be between 1 and 5".
    pub constraint: String,
    /// Rendered rejected value, `None` when the field was absent.
    pub rejected_value: Option<String>,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        constraint: impl Into<String>,
        rejected_value: Option<String>,
    ) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
            rejected_value,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// A remote dependency could not give an answer; its opinion is unknown.
    #[error("{service} unreachable while resolving {entity} {field}={value}: {reason}")]
    Unreachable {
        service: &'static str,
        entity: &'static str,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed on {} field(s)", .0.len())]
    ValidationFailed(Vec<FieldViolation>),

    /// A request parameter could not be read as the expected type.
    #[error("Invalid parameter {name}={value}, expected {expected}")]
    InvalidParameter {
        name: String,
        value: String,
        expected: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Unreachable { .. } => ErrorKind::Unreachable,
            DomainError::ValidationFailed(_) | DomainError::InvalidParameter { .. } => {
                ErrorKind::ValidationFailed
            }
            DomainError::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    pub fn review_not_found(id: i32) -> Self {
        DomainError::NotFound {
            entity: "Review",
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        DomainError::InvalidParameter {
            name: name.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn course_not_found(course_id: CourseId) -> Self {
        DomainError::NotFound {
            entity: "Course",
            field: "course_id",
            value: course_id.to_string(),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Stable error taxonomy handed to whatever presentation layer sits on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    Unreachable,
    ValidationFailed,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Unreachable => "UNREACHABLE",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::StorageFailure => "STORAGE_FAILURE",
        }
    }

    /// Whether the failure is a write-time rejection of the caller's input
    /// rather than an internal fault.
    pub fn is_validation_class(&self) -> bool {
        !matches!(self, Self::StorageFailure)
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Unreachable => 503,
            Self::ValidationFailed => 422,
            Self::StorageFailure => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Catalog lookup ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnreachableCause {
    /// The call did not complete within the lookup timeout.
    Timeout,
    /// Connection refused/reset, or a gateway-style status from the catalog.
    Transport(String),
    /// The catalog answered with something this client does not understand.
    Protocol(String),
}

impl fmt::Display for UnreachableCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::Protocol(msg) => write!(f, "protocol error: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    /// The catalog responded authoritatively: no such course.
    #[error("Course {course_id} not found in catalog")]
    NotFound { course_id: CourseId },

    #[error("Catalog unreachable for course {course_id}: {cause}")]
    Unreachable {
        course_id: CourseId,
        cause: UnreachableCause,
    },
}

impl LookupFailure {
    /// Only transport hiccups are worth a second attempt. Timeouts already
    /// spent the whole call budget and NotFound is an answer.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LookupFailure::Unreachable {
                cause: UnreachableCause::Transport(_),
                ..
            }
        )
    }

    pub fn course_id(&self) -> CourseId {
        match self {
            LookupFailure::NotFound { course_id } => *course_id,
            LookupFailure::Unreachable { course_id, .. } => *course_id,
        }
    }
}

impl From<LookupFailure> for DomainError {
    fn from(failure: LookupFailure) -> Self {
        match failure {
            LookupFailure::NotFound { course_id } => DomainError::course_not_found(course_id),
            LookupFailure::Unreachable { course_id, cause } => DomainError::Unreachable {
                service: "Course catalog",
                entity: "Course",
                field: "course_id",
                value: course_id.to_string(),
                reason: cause.to_string(),
            },
        }
    }
}

// ── Structural validation ──────────────────────────────────────

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    FieldViolation::new(field.clone(), describe_constraint(e), rejected_value(e))
                })
            })
            .collect();
        // field_errors() is a HashMap; keep output deterministic
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        DomainError::ValidationFailed(violations)
    }
}

fn describe_constraint(error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let param = |name: &str| error.params.get(name).map(render_value);
    match &*error.code {
        "required" => "must not be null".to_string(),
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("must be between {} and {}", min, max),
            (Some(min), None) => format!("must be greater than or equal to {}", min),
            (None, Some(max)) => format!("must be less than or equal to {}", max),
            (None, None) => "is out of range".to_string(),
        },
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("length must be between {} and {}", min, max),
            (Some(min), None) => format!("length must be at least {}", min),
            (None, Some(max)) => format!("length must be at most {}", max),
            (None, None) => "has an invalid length".to_string(),
        },
        code => format!("is invalid ({})", code),
    }
}

fn rejected_value(error: &validator::ValidationError) -> Option<String> {
    error.params.get("value").map(render_value)
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Cache ──────────────────────────────────────────────────────

/// Cache failures never reach callers of the catalog; the cache decorator
/// downgrades them to a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache node {0} is not connected")]
    NotConnected(String),

    #[error("Cache connect to {node} failed: {reason}")]
    Connect { node: String, reason: String },

    #[error("Cache command timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn lookup_failure_maps_to_domain_taxonomy() {
        let not_found: DomainError = LookupFailure::NotFound { course_id: 999 }.into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.to_string(), "Not found: Course with course_id=999");

        let unreachable: DomainError = LookupFailure::Unreachable {
            course_id: 7,
            cause: UnreachableCause::Timeout,
        }
        .into();
        assert_eq!(unreachable.kind(), ErrorKind::Unreachable);
        assert!(unreachable.kind().is_validation_class());
    }

    #[test]
    fn only_transport_errors_are_transient() {
        let transport = LookupFailure::Unreachable {
            course_id: 1,
            cause: UnreachableCause::Transport("connection reset".into()),
        };
        let timeout = LookupFailure::Unreachable {
            course_id: 1,
            cause: UnreachableCause::Timeout,
        };
        assert!(transport.is_transient());
        assert!(!timeout.is_transient());
        assert!(!LookupFailure::NotFound { course_id: 1 }.is_transient());
    }

    #[test]
    fn validation_errors_carry_field_detail() {
        let mut rating = ValidationError::new("range");
        rating.add_param("min".into(), &1);
        rating.add_param("max".into(), &5);
        rating.add_param("value".into(), &9);

        let mut errors = ValidationErrors::new();
        errors.add("rating", rating);
        errors.add("course_id", ValidationError::new("required"));

        let DomainError::ValidationFailed(violations) = DomainError::from(errors) else {
            panic!("expected validation failure");
        };
        assert_eq!(
            violations,
            vec![
                FieldViolation::new("course_id", "must not be null", None),
                FieldViolation::new("rating", "must be between 1 and 5", Some("9".into())),
            ]
        );
    }

    #[test]
    fn storage_failure_is_not_validation_class() {
        assert!(!ErrorKind::StorageFailure.is_validation_class());
        assert_eq!(ErrorKind::StorageFailure.http_status(), 500);
    }
}
