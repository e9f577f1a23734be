//! SeaORM implementation of ReviewStore

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::domain::{DomainError, DomainResult, Review, ReviewStore};
use crate::infrastructure::database::entities::review;

// ── Conversion helpers ──────────────────────────────────────────

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

fn entity_to_domain(r: review::Model) -> Review {
    Review {
        id: Some(r.id),
        course_id: r.course_id,
        author: r.author,
        text: r.text,
        rating: r.rating,
        created_at: r.created_at,
    }
}

/// `[date 00:00 UTC, next day 00:00 UTC)`
fn day_bounds(date: NaiveDate) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    (start, start + chrono::Duration::days(1))
}

// ── SeaOrmReviewStore ───────────────────────────────────────────

pub struct SeaOrmReviewStore {
    db: DatabaseConnection,
}

impl SeaOrmReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewStore for SeaOrmReviewStore {
    async fn find_all(&self) -> DomainResult<Vec<Review>> {
        let models = review::Entity::find()
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(entity_to_domain).collect())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Review>> {
        let model = review::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(entity_to_domain))
    }

    async fn save(&self, r: Review) -> DomainResult<Review> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let saved = match r.id {
            None => review::ActiveModel {
                id: NotSet,
                course_id: Set(r.course_id),
                author: Set(r.author),
                text: Set(r.text),
                rating: Set(r.rating),
                created_at: Set(r.created_at),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?,
            Some(id) => {
                let existing = review::Entity::find_by_id(id)
                    .one(&txn)
                    .await
                    .map_err(db_err)?;

                // Dropping the transaction rolls it back
                let Some(existing) = existing else {
                    return Err(DomainError::review_not_found(id));
                };

                let mut active: review::ActiveModel = existing.into();
                active.course_id = Set(r.course_id);
                active.author = Set(r.author);
                active.text = Set(r.text);
                active.rating = Set(r.rating);
                active.update(&txn).await.map_err(db_err)?
            }
        };

        txn.commit().await.map_err(db_err)?;
        info!(id = saved.id, course_id = saved.course_id, "Review saved");
        Ok(entity_to_domain(saved))
    }

    async fn delete_by_id(&self, id: i32) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let result = review::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::review_not_found(id));
        }
        txn.commit().await.map_err(db_err)?;
        info!(id, "Review deleted");
        Ok(())
    }

    async fn find_all_by_created_at(&self, date: NaiveDate) -> DomainResult<Vec<Review>> {
        let (start, end) = day_bounds(date);
        debug!(%date, "Listing reviews by creation date");
        let models = review::Entity::find()
            .filter(review::Column::CreatedAt.gte(start))
            .filter(review::Column::CreatedAt.lt(end))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(entity_to_domain).collect())
    }

    async fn count(&self) -> DomainResult<u64> {
        review::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
