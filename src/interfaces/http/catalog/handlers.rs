//! Catalog handlers. Bodies are bare course summaries, the wire format the
//! review service's catalog client decodes.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::debug;

use crate::application::{CourseRegistry, ErrorNormalizer};
use crate::domain::{CourseId, CourseSummary, DomainError};
use crate::interfaces::http::common::{ApiError, ApiPath};

#[derive(Clone)]
pub struct CourseApiState {
    pub registry: Arc<CourseRegistry>,
}

/// `GET /api/v1/courses`
pub async fn list_courses(State(state): State<CourseApiState>) -> Json<Vec<CourseSummary>> {
    Json(state.registry.find_all())
}

/// `GET /api/v1/courses/{id}`; 404 when the course is unknown
pub async fn get_course(
    State(state): State<CourseApiState>,
    ApiPath(id): ApiPath<CourseId>,
) -> Result<Json<CourseSummary>, ApiError> {
    match state.registry.find_by_id(id) {
        Some(course) => Ok(Json(course)),
        None => {
            debug!(course_id = id, "Course lookup miss");
            Err(ErrorNormalizer::new()
                .normalize(&DomainError::course_not_found(id))
                .into())
        }
    }
}
