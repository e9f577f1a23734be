//! In-memory review store implementation

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use crate::domain::{DomainError, DomainResult, Review, ReviewStore};

/// In-memory review store for development and testing
pub struct InMemoryReviewStore {
    reviews: DashMap<i32, Review>,
    id_counter: AtomicI32,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self {
            reviews: DashMap::new(),
            id_counter: AtomicI32::new(1),
        }
    }

    fn sorted(mut reviews: Vec<Review>) -> Vec<Review> {
        reviews.sort_by_key(|r| r.id);
        reviews
    }
}

impl Default for InMemoryReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn find_all(&self) -> DomainResult<Vec<Review>> {
        Ok(Self::sorted(
            self.reviews.iter().map(|r| r.value().clone()).collect(),
        ))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Review>> {
        Ok(self.reviews.get(&id).map(|r| r.value().clone()))
    }

    async fn save(&self, mut review: Review) -> DomainResult<Review> {
        match review.id {
            None => {
                let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
                review.id = Some(id);
                self.reviews.insert(id, review.clone());
                Ok(review)
            }
            Some(id) => {
                let mut stored = self
                    .reviews
                    .get_mut(&id)
                    .ok_or_else(|| DomainError::review_not_found(id))?;
                stored.course_id = review.course_id;
                stored.author = review.author;
                stored.text = review.text;
                stored.rating = review.rating;
                Ok(stored.clone())
            }
        }
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<()> {
        self.reviews
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::review_not_found(id))
    }

    async fn find_all_by_created_at(&self, date: NaiveDate) -> DomainResult<Vec<Review>> {
        Ok(Self::sorted(
            self.reviews
                .iter()
                .filter(|r| r.created_on() == date)
                .map(|r| r.value().clone())
                .collect(),
        ))
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.reviews.len() as u64)
    }
}
