//! End-to-end write gate: reviews service logic against a real catalog server

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use course_reviews::application::CourseRegistry;
use course_reviews::config::AppConfig;
use course_reviews::domain::{CourseCatalog, CourseId, CourseSummary, InstructorSummary};
use course_reviews::infrastructure::{
    CachedCatalog, HttpCatalogClient, InMemoryCourseCache, InMemoryReviewStore, LookupPolicy,
};
use course_reviews::server::{start_catalog_server, ServerHandle};
use course_reviews::shared::{RetryConfig, ShutdownSignal};
use course_reviews::support::errors::LookupFailure;
use course_reviews::{DomainError, ErrorKind, ErrorNormalizer, NewReview, ReviewService, ReviewStore};

fn systems_programming() -> CourseSummary {
    let at = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
    CourseSummary {
        id: 42,
        name: "Systems Programming".into(),
        category: "Engineering".into(),
        programming_language: "Rust".into(),
        programming_language_description: "Memory-safe systems language".into(),
        created_at: at,
        updated_at: at,
        instructor: InstructorSummary {
            id: 1,
            name: "Grace".into(),
            summary: "Compiler engineer".into(),
            description: "Teaches low-level programming".into(),
        },
    }
}

async fn start_catalog(shutdown: &ShutdownSignal) -> ServerHandle {
    let mut config = AppConfig::default();
    config.catalog_service.host = "127.0.0.1".into();
    config.catalog_service.port = 0;

    let registry = Arc::new(CourseRegistry::from_courses([systems_programming()]));
    start_catalog_server(&config, registry, shutdown.clone())
        .await
        .unwrap()
}

fn policy() -> LookupPolicy {
    LookupPolicy {
        call_timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(1),
        keepalive: Duration::from_secs(3),
        retry: RetryConfig::single_retry(Duration::from_millis(10)),
    }
}

/// Counts calls that reach the remote catalog
struct Counted<C> {
    inner: C,
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl<C: CourseCatalog> CourseCatalog for Counted<C> {
    async fn lookup_course(&self, id: CourseId) -> Result<CourseSummary, LookupFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup_course(id).await
    }
}

#[tokio::test]
async fn review_is_stored_only_for_known_course() {
    let shutdown = ShutdownSignal::new();
    let catalog_server = start_catalog(&shutdown).await;

    let calls = Arc::new(AtomicU32::new(0));
    let remote = Counted {
        inner: HttpCatalogClient::new(format!("http://{}", catalog_server.local_addr()), policy())
            .unwrap(),
        calls: calls.clone(),
    };
    let catalog = CachedCatalog::new(
        remote,
        Arc::new(InMemoryCourseCache::new()),
        Duration::from_secs(60),
    );
    let store = Arc::new(InMemoryReviewStore::new());
    let service = ReviewService::new(store.clone(), Arc::new(catalog));

    let saved = service
        .save(NewReview::new(42, "ada", "Loved the borrow checker chapter", 5))
        .await
        .unwrap();
    assert!(saved.id.is_some());
    assert_eq!(saved.course_id, 42);

    let err = service
        .save(NewReview::new(999, "bob", "Course does not exist", 3))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.count().await.unwrap(), 1);

    // Second review for 42 is validated from the cache
    service
        .save(NewReview::new(42, "eve", "Second opinion", 4))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.count().await.unwrap(), 2);

    shutdown.trigger();
    catalog_server.wait().await;
}

#[tokio::test]
async fn stopped_catalog_rejects_writes_as_unreachable() {
    let shutdown = ShutdownSignal::new();
    let catalog_server = start_catalog(&shutdown).await;
    let addr = catalog_server.local_addr();
    shutdown.trigger();
    catalog_server.wait().await;

    let client = HttpCatalogClient::new(format!("http://{}", addr), policy()).unwrap();
    let store = Arc::new(InMemoryReviewStore::new());
    let service = ReviewService::new(store.clone(), Arc::new(client));

    let err = service
        .save(NewReview::new(42, "ada", "Anyone home?", 5))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Unreachable { .. }));
    assert_eq!(store.count().await.unwrap(), 0);

    let normalized = ErrorNormalizer::new().normalize(&err);
    assert_eq!(normalized.kind, ErrorKind::NotFound);
    assert_eq!(normalized.path.as_deref(), Some("course_id"));
}
