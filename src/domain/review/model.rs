//! Review domain entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::NewReview;
use crate::domain::CourseId;

/// A course review. The store is the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    /// Assigned by the store on create
    pub id: Option<i32>,
    /// Catalog course this review refers to
    #[schema(value_type = i32)]
    pub course_id: CourseId,
    pub author: String,
    pub text: String,
    /// 1..=5
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Build an unsaved review from validated input.
    ///
    /// Callers must have run `NewReview::validate` first; a missing course id
    /// falls back to 0, which no catalog recognizes.
    pub fn from_new(new: NewReview, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            course_id: new.course_id.unwrap_or_default(),
            author: new.author,
            text: new.text,
            rating: new.rating,
            created_at,
        }
    }

    /// Calendar day (UTC) the review was written on
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn from_new_leaves_id_unassigned() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let review = Review::from_new(
            NewReview {
                course_id: Some(42),
                author: "ada".into(),
                text: "Great pacing".into(),
                rating: 5,
            },
            created_at,
        );

        assert_eq!(review.id, None);
        assert_eq!(review.course_id, 42);
        assert_eq!(review.created_on(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
