//! Maps domain errors to a stable, presentation-neutral shape
//!
//! Messages are assembled from structured error fields. Storage details are
//! logged and never handed to callers.

use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::support::errors::{DomainError, ErrorKind, FieldViolation};

/// One normalized error, ready for any presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NormalizedError {
    #[schema(value_type = String, example = "NOT_FOUND")]
    pub kind: ErrorKind,
    pub message: String,
    /// Offending input field, when the error is attributable to exactly one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorNormalizer {
    expose_catalog_outage: bool,
}

impl ErrorNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// When disabled (the default), a remote outage during validation is
    /// reported exactly like a missing entity and only the logs show the
    /// real cause.
    pub fn expose_catalog_outage(mut self, expose: bool) -> Self {
        self.expose_catalog_outage = expose;
        self
    }

    pub fn normalize(&self, err: &DomainError) -> NormalizedError {
        match err {
            DomainError::NotFound { entity, field, value } => not_found(entity, field, value),
            DomainError::Unreachable {
                service,
                entity,
                field,
                value,
                reason,
            } => {
                if self.expose_catalog_outage {
                    NormalizedError {
                        kind: ErrorKind::Unreachable,
                        message: format!(
                            "{} unavailable, could not verify {} with {}={}",
                            service, entity, field, value
                        ),
                        path: Some(field.to_string()),
                    }
                } else {
                    warn!(
                        service,
                        field,
                        value = %value,
                        reason = %reason,
                        "Remote outage reported as not found"
                    );
                    not_found(entity, field, value)
                }
            }
            DomainError::ValidationFailed(violations) => validation_failed(violations),
            DomainError::InvalidParameter { name, value, expected } => NormalizedError {
                kind: ErrorKind::ValidationFailed,
                message: format!(
                    "Parameter: '{}' is not valid. Value '{}' could not be bound to type {}",
                    name, value, expected
                ),
                path: Some(name.clone()),
            },
            DomainError::Storage(detail) => {
                error!(detail = %detail, "Storage failure");
                NormalizedError {
                    kind: ErrorKind::StorageFailure,
                    message: "Internal storage failure".to_string(),
                    path: None,
                }
            }
        }
    }
}

fn not_found(entity: &str, field: &str, value: &str) -> NormalizedError {
    NormalizedError {
        kind: ErrorKind::NotFound,
        message: format!("{} with {}={} not found", entity, field, value),
        path: Some(field.to_string()),
    }
}

struct FieldReport<'a> {
    field: &'a str,
    constraints: Vec<&'a str>,
    rejected_value: Option<&'a str>,
}

/// One line per field; repeated constraint descriptions collapse into one.
fn validation_failed(violations: &[FieldViolation]) -> NormalizedError {
    let mut reports: Vec<FieldReport<'_>> = Vec::new();

    for v in violations {
        let idx = match reports.iter().position(|r| r.field == v.field) {
            Some(idx) => idx,
            None => {
                reports.push(FieldReport {
                    field: &v.field,
                    constraints: Vec::new(),
                    rejected_value: None,
                });
                reports.len() - 1
            }
        };
        let report = &mut reports[idx];
        if !report.constraints.contains(&v.constraint.as_str()) {
            report.constraints.push(&v.constraint);
        }
        if report.rejected_value.is_none() {
            report.rejected_value = v.rejected_value.as_deref();
        }
    }

    let message = reports
        .iter()
        .map(|r| {
            format!(
                "Field '{}' {}, but value was [{}]",
                r.field,
                r.constraints.join(", "),
                r.rejected_value.unwrap_or("null")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let path = match reports.as_slice() {
        [only] => Some(only.field.to_string()),
        _ => None,
    };

    NormalizedError {
        kind: ErrorKind::ValidationFailed,
        message,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::errors::{LookupFailure, UnreachableCause};

    fn outage() -> DomainError {
        LookupFailure::Unreachable {
            course_id: 42,
            cause: UnreachableCause::Timeout,
        }
        .into()
    }

    #[test]
    fn not_found_names_entity_and_field() {
        let normalized = ErrorNormalizer::new().normalize(&DomainError::course_not_found(999));
        assert_eq!(normalized.kind, ErrorKind::NotFound);
        assert_eq!(normalized.message, "Course with course_id=999 not found");
        assert_eq!(normalized.path.as_deref(), Some("course_id"));
    }

    #[test]
    fn outage_is_folded_into_not_found_by_default() {
        let normalized = ErrorNormalizer::new().normalize(&outage());
        assert_eq!(
            normalized,
            ErrorNormalizer::new().normalize(&DomainError::course_not_found(42))
        );
    }

    #[test]
    fn outage_can_be_exposed() {
        let normalized = ErrorNormalizer::new()
            .expose_catalog_outage(true)
            .normalize(&outage());
        assert_eq!(normalized.kind, ErrorKind::Unreachable);
        assert!(normalized.message.starts_with("Course catalog unavailable"));
        assert_eq!(normalized.path.as_deref(), Some("course_id"));
    }

    #[test]
    fn two_violations_on_one_field_yield_one_message() {
        let err = DomainError::ValidationFailed(vec![
            FieldViolation::new("rating", "must be between 1 and 5", Some("9".into())),
            FieldViolation::new("rating", "must be between 1 and 5", Some("9".into())),
        ]);
        let normalized = ErrorNormalizer::new().normalize(&err);

        assert_eq!(normalized.kind, ErrorKind::ValidationFailed);
        assert_eq!(normalized.message, "Field 'rating' must be between 1 and 5, but value was [9]");
        assert_eq!(normalized.path.as_deref(), Some("rating"));
    }

    #[test]
    fn distinct_constraints_share_a_line() {
        let err = DomainError::ValidationFailed(vec![
            FieldViolation::new("author", "length must be between 1 and 100", Some("".into())),
            FieldViolation::new("author", "must not be blank", Some("".into())),
            FieldViolation::new("course_id", "must not be null", None),
        ]);
        let normalized = ErrorNormalizer::new().normalize(&err);

        let lines: Vec<&str> = normalized.message.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Field 'author' length must be between 1 and 100, must not be blank, but value was []",
                "Field 'course_id' must not be null, but value was [null]",
            ]
        );
        assert_eq!(normalized.path, None);
    }

    #[test]
    fn unbindable_parameter_names_value_and_type() {
        let err = DomainError::invalid_parameter("id", "abc", "i32");
        let normalized = ErrorNormalizer::new().normalize(&err);

        assert_eq!(normalized.kind, ErrorKind::ValidationFailed);
        assert_eq!(
            normalized.message,
            "Parameter: 'id' is not valid. Value 'abc' could not be bound to type i32"
        );
        assert_eq!(normalized.path.as_deref(), Some("id"));
    }

    #[test]
    fn storage_details_stay_internal() {
        let normalized = ErrorNormalizer::new()
            .normalize(&DomainError::Storage("disk I/O error at page 7".into()));
        assert_eq!(normalized.kind, ErrorKind::StorageFailure);
        assert_eq!(normalized.message, "Internal storage failure");
        assert!(!normalized.kind.is_validation_class());
    }
}
