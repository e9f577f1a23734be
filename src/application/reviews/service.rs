//! Review service: application-layer orchestration
//!
//! Writes are gated on the course catalog: a review is only persisted after
//! the catalog confirmed its course. Reads go straight to the store.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::domain::{
    CourseCatalog, CourseId, DomainError, DomainResult, NewReview, Review, ReviewStore,
};

pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
    catalog: Arc<dyn CourseCatalog>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn ReviewStore>, catalog: Arc<dyn CourseCatalog>) -> Self {
        Self { store, catalog }
    }

    // ── Reads ───────────────────────────────────────────────────

    pub async fn find_all(&self) -> DomainResult<Vec<Review>> {
        self.store.find_all().await
    }

    pub async fn find_by_id(&self, id: i32) -> DomainResult<Review> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::review_not_found(id))
    }

    pub async fn find_all_by_created_at(&self, date: NaiveDate) -> DomainResult<Vec<Review>> {
        self.store.find_all_by_created_at(date).await
    }

    pub async fn delete_by_id(&self, id: i32) -> DomainResult<()> {
        self.store.delete_by_id(id).await
    }

    pub async fn count(&self) -> DomainResult<u64> {
        self.store.count().await
    }

    // ── Writes ──────────────────────────────────────────────────

    /// Validate the input, confirm the course with the catalog, then persist.
    ///
    /// The store is not touched unless the catalog found the course.
    pub async fn save(&self, new: NewReview) -> DomainResult<Review> {
        let course_id = validated_course_id(&new)?;
        self.confirm_course(course_id).await?;

        let saved = self
            .store
            .save(Review::from_new(new, Utc::now()))
            .await
            .inspect_err(|_| reject("storage"))?;

        metrics::counter!("reviews_saved_total").increment(1);
        info!(id = ?saved.id, course_id, "Review created");
        Ok(saved)
    }

    /// Replace review `id` with `new`, passing through the same gate as
    /// [`save`](Self::save). The creation time is kept.
    pub async fn update(&self, id: i32, new: NewReview) -> DomainResult<Review> {
        let course_id = validated_course_id(&new)?;
        let existing = self.find_by_id(id).await?;
        self.confirm_course(course_id).await?;

        let mut review = Review::from_new(new, existing.created_at);
        review.id = Some(id);
        let saved = self
            .store
            .save(review)
            .await
            .inspect_err(|_| reject("storage"))?;

        metrics::counter!("reviews_saved_total").increment(1);
        info!(id, course_id, "Review updated");
        Ok(saved)
    }

    /// Drop the cached copy of a course so the next write re-checks the
    /// catalog. A no-op when lookups are not cached.
    pub async fn evict_course(&self, course_id: CourseId) -> DomainResult<()> {
        self.catalog
            .invalidate_course(course_id)
            .await
            .map_err(|e| DomainError::Storage(format!("course cache: {}", e)))?;
        info!(course_id, "Cached course evicted");
        Ok(())
    }

    async fn confirm_course(&self, course_id: CourseId) -> DomainResult<()> {
        match self.catalog.lookup_course(course_id).await {
            Ok(course) => {
                debug!(course_id, course = %course.name, "Course confirmed by catalog");
                Ok(())
            }
            Err(failure) => {
                let err = DomainError::from(failure);
                match &err {
                    DomainError::Unreachable { reason, .. } => {
                        warn!(course_id, reason = %reason, "Review rejected: catalog unreachable");
                        reject("catalog_unreachable");
                    }
                    _ => {
                        info!(course_id, "Review rejected: course not found");
                        reject("course_not_found");
                    }
                }
                Err(err)
            }
        }
    }
}

fn validated_course_id(new: &NewReview) -> DomainResult<CourseId> {
    if let Err(errors) = new.validate() {
        reject("invalid_input");
        return Err(errors.into());
    }
    Ok(new.course_id.unwrap_or_default())
}

fn reject(reason: &'static str) {
    metrics::counter!("reviews_rejected_total", "reason" => reason).increment(1);
}
