//! Health check handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::{CourseRegistry, ReviewService};

/// Service health response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Review store check (reviews service only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<ComponentHealth>,
    /// Courses held by the registry (catalog service only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<usize>,
}

/// Component health status
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

impl HealthResponse {
    fn new(status: &str, started_at: Instant) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: started_at.elapsed().as_secs(),
            store: None,
            courses: None,
        }
    }
}

#[derive(Clone)]
pub struct ReviewsHealthState {
    pub service: Arc<ReviewService>,
    pub started_at: Instant,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Review store is failing", body = HealthResponse)
    )
)]
pub async fn reviews_health(
    State(state): State<ReviewsHealthState>,
) -> (StatusCode, Json<HealthResponse>) {
    let check_start = Instant::now();
    let store = match state.service.count().await {
        Ok(_) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(check_start.elapsed().as_millis() as u64),
        },
        Err(_) => ComponentHealth {
            status: "error".to_string(),
            latency_ms: None,
        },
    };

    let (http_status, overall) = if store.status == "ok" {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let mut body = HealthResponse::new(overall, state.started_at);
    body.store = Some(store);
    (http_status, Json(body))
}

#[derive(Clone)]
pub struct CatalogHealthState {
    pub registry: Arc<CourseRegistry>,
    pub started_at: Instant,
}

pub async fn catalog_health(State(state): State<CatalogHealthState>) -> Json<HealthResponse> {
    let mut body = HealthResponse::new("ok", state.started_at);
    body.courses = Some(state.registry.len());
    Json(body)
}
