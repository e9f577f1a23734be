//! SeaORM review store on in-memory SQLite

use chrono::{NaiveDate, TimeZone, Utc};
use course_reviews::domain::{NewReview, Review, ReviewStore};
use course_reviews::infrastructure::{init_database, DatabaseConfig, SeaOrmReviewStore};
use course_reviews::DomainError;

async fn store() -> SeaOrmReviewStore {
    let db = init_database(&DatabaseConfig::sqlite_in_memory()).await.unwrap();
    SeaOrmReviewStore::new(db)
}

fn review_on(day: u32, hour: u32) -> Review {
    Review::from_new(
        NewReview::new(42, "ada", "Clear and well paced", 5),
        Utc.with_ymd_and_hms(2024, 5, day, hour, 30, 0).unwrap(),
    )
}

#[tokio::test]
async fn insert_assigns_ids_and_round_trips() {
    let store = store().await;

    let a = store.save(review_on(1, 10)).await.unwrap();
    let b = store.save(review_on(1, 11)).await.unwrap();
    assert!(a.id.is_some());
    assert_ne!(a.id, b.id);

    let fetched = store.find_by_id(a.id.unwrap()).await.unwrap().unwrap();
    assert_eq!(fetched, a);
    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(store.find_all().await.unwrap(), vec![a, b]);
}

#[tokio::test]
async fn update_overwrites_all_but_creation_time() {
    let store = store().await;
    let saved = store.save(review_on(1, 10)).await.unwrap();

    let mut edit = review_on(3, 8);
    edit.id = saved.id;
    edit.rating = 2;
    edit.text = "Second half dragged".into();
    edit.course_id = 7;
    let updated = store.save(edit).await.unwrap();

    assert_eq!(updated.rating, 2);
    assert_eq!(updated.text, "Second half dragged");
    assert_eq!(updated.course_id, 7);
    assert_eq!(updated.created_at, saved.created_at);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn filters_by_utc_creation_day() {
    let store = store().await;
    store.save(review_on(1, 23)).await.unwrap();
    store.save(review_on(2, 0)).await.unwrap();
    store.save(review_on(2, 22)).await.unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let found = store.find_all_by_created_at(day).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|r| r.created_on() == day));
}

#[tokio::test]
async fn delete_removes_and_then_reports_not_found() {
    let store = store().await;
    let saved = store.save(review_on(1, 10)).await.unwrap();
    let id = saved.id.unwrap();

    store.delete_by_id(id).await.unwrap();
    assert!(store.find_by_id(id).await.unwrap().is_none());

    let err = store.delete_by_id(id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "Review", .. }));
}

#[tokio::test]
async fn updating_missing_review_is_not_found() {
    let store = store().await;
    let mut ghost = review_on(1, 10);
    ghost.id = Some(123);

    let err = store.save(ghost).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
    assert_eq!(store.count().await.unwrap(), 0);
}
