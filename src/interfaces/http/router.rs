//! API routers with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::catalog::{self, CourseApiState};
use super::common::{ApiResponse, ErrorBody};
use super::health::{self, CatalogHealthState, ComponentHealth, HealthResponse, ReviewsHealthState};
use super::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::reviews::{self, ReviewApiState};
use crate::application::{CourseRegistry, ErrorNormalizer, ReviewService};
use crate::domain::{NewReview, Review};

// ── Reviews service ────────────────────────────────────────────

/// Unified state for the reviews router; handlers extract their own slice
/// via `FromRef`.
#[derive(Clone)]
pub struct ReviewsState {
    pub service: Arc<ReviewService>,
    pub normalizer: ErrorNormalizer,
    pub started_at: Instant,
}

impl ReviewsState {
    pub fn new(service: Arc<ReviewService>, normalizer: ErrorNormalizer) -> Self {
        Self {
            service,
            normalizer,
            started_at: Instant::now(),
        }
    }
}

impl FromRef<ReviewsState> for ReviewApiState {
    fn from_ref(s: &ReviewsState) -> Self {
        ReviewApiState {
            service: Arc::clone(&s.service),
            normalizer: s.normalizer,
        }
    }
}

impl FromRef<ReviewsState> for ReviewsHealthState {
    fn from_ref(s: &ReviewsState) -> Self {
        ReviewsHealthState {
            service: Arc::clone(&s.service),
            started_at: s.started_at,
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::reviews_health,
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        reviews::evict_course,
    ),
    components(schemas(
        ApiResponse<Review>,
        ErrorBody,
        Review,
        NewReview,
        HealthResponse,
        ComponentHealth,
    )),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Reviews", description = "Course reviews, validated against the course catalog"),
        (name = "Cache", description = "Course cache maintenance for catalog-change notifications"),
    ),
    info(
        title = "Course Reviews API",
        version = "1.0.0",
        description = "Reviews whose course references are checked against the remote course catalog"
    )
)]
pub struct ReviewsApiDoc;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the reviews service router. `/metrics` is mounted only when a
/// Prometheus handle is supplied.
pub fn create_reviews_router(state: ReviewsState, metrics: Option<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/v1/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/api/v1/reviews/{id}",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/api/v1/cache/courses/{course_id}",
            delete(reviews::evict_course),
        )
        .route("/health", get(health::reviews_health))
        .with_state(state);

    let mut app = Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ReviewsApiDoc::openapi()));

    if let Some(handle) = metrics {
        app = app.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    app.layer(middleware::from_fn(http_metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
}

// ── Catalog service ────────────────────────────────────────────

#[derive(Clone)]
pub struct CatalogState {
    pub registry: Arc<CourseRegistry>,
    pub started_at: Instant,
}

impl CatalogState {
    pub fn new(registry: Arc<CourseRegistry>) -> Self {
        Self {
            registry,
            started_at: Instant::now(),
        }
    }
}

impl FromRef<CatalogState> for CourseApiState {
    fn from_ref(s: &CatalogState) -> Self {
        CourseApiState {
            registry: Arc::clone(&s.registry),
        }
    }
}

impl FromRef<CatalogState> for CatalogHealthState {
    fn from_ref(s: &CatalogState) -> Self {
        CatalogHealthState {
            registry: Arc::clone(&s.registry),
            started_at: s.started_at,
        }
    }
}

/// Create the catalog service router
pub fn create_catalog_router(state: CatalogState) -> Router {
    Router::new()
        .route("/api/v1/courses", get(catalog::list_courses))
        .route("/api/v1/courses/{id}", get(catalog::get_course))
        .route("/health", get(health::catalog_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────
