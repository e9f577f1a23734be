//! Review store interface

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::Review;
use crate::domain::DomainResult;

/// Non-blocking CRUD store for reviews, the system of record.
///
/// Store failures surface as `DomainError::Storage`.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn find_all(&self) -> DomainResult<Vec<Review>>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Review>>;
    /// Insert when `review.id` is `None`, otherwise overwrite everything but
    /// `created_at` on the stored record (`NotFound` if it is gone). Returns
    /// the persisted review with its id assigned.
    async fn save(&self, review: Review) -> DomainResult<Review>;
    /// `DomainError::NotFound` when nothing was deleted
    async fn delete_by_id(&self, id: i32) -> DomainResult<()>;
    /// Reviews whose UTC creation date equals `date`
    async fn find_all_by_created_at(&self, date: NaiveDate) -> DomainResult<Vec<Review>>;
    async fn count(&self) -> DomainResult<u64>;
}
