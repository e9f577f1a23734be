use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::CourseId;

/// Write-side input for a new review, checked structurally before the
/// catalog is ever consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewReview {
    #[validate(required, range(min = 1))]
    #[schema(value_type = Option<i32>)]
    pub course_id: Option<CourseId>,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
}

impl NewReview {
    pub fn new(course_id: CourseId, author: impl Into<String>, text: impl Into<String>, rating: i32) -> Self {
        Self {
            course_id: Some(course_id),
            author: author.into(),
            text: text.into(),
            rating,
        }
    }
}
