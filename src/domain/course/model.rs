//! Course summary as served by the catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog addressing key for a course
pub type CourseId = i32;

/// Instructor sub-record of a course summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorSummary {
    pub id: i32,
    pub name: String,
    pub summary: String,
    pub description: String,
}

/// Result of a successful catalog lookup.
///
/// Also the wire format of `GET /api/v1/courses/{id}` and the value stored in
/// the course cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: CourseId,
    pub name: String,
    pub category: String,
    pub programming_language: String,
    pub programming_language_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub instructor: InstructorSummary,
}
