//! Service runtime shared by both binaries.
//!
//! Wires configuration into concrete adapters (catalog client, cache, store),
//! starts the HTTP servers and ties them to a [`ShutdownSignal`].

use std::error::Error;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{CourseRegistry, ReviewService};
use crate::config::{default_config_path, AppConfig, CacheBackend, StoreBackend};
use crate::domain::{CourseCache, CourseCatalog, ReviewStore};
use crate::infrastructure::{
    init_database, CachedCatalog, HttpCatalogClient, InMemoryCourseCache, InMemoryReviewStore,
    RedisCourseCache, SeaOrmReviewStore,
};
use crate::interfaces::http::{
    create_catalog_router, create_reviews_router, CatalogState, ReviewsState,
};
use crate::shared::ShutdownSignal;

pub type BoxError = Box<dyn Error + Send + Sync>;

// ── Configuration & logging ────────────────────────────────────────

/// Config path from `env_var`, else the per-user default
pub fn config_path_from_env(env_var: &str) -> PathBuf {
    std::env::var(env_var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

/// Load the config, falling back to defaults. Tracing is initialized from
/// whichever config wins, so a load failure is still logged.
pub fn load_config_and_init_tracing(path: &Path) -> AppConfig {
    match AppConfig::load(path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config: {}. Using defaults.", e);
            cfg
        }
    }
}

/// Initialize tracing (logging) from the application config.
///
/// `RUST_LOG` wins over `logging.level`. Call once per process.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

// ── Adapter wiring ─────────────────────────────────────────────────

/// Catalog client, wrapped in the configured cache when caching is enabled.
pub async fn build_catalog(
    config: &AppConfig,
    shutdown: &ShutdownSignal,
) -> Result<Arc<dyn CourseCatalog>, BoxError> {
    let client = HttpCatalogClient::new(&config.catalog.base_url, config.catalog.lookup_policy())?;
    info!(base_url = %client.base_url(), "Course catalog client ready");

    if !config.cache.enabled {
        warn!("Course cache disabled, every validation hits the catalog");
        return Ok(Arc::new(client));
    }

    let cache: Arc<dyn CourseCache> = match config.cache.backend {
        CacheBackend::Memory => {
            info!("Using in-process course cache");
            Arc::new(InMemoryCourseCache::new())
        }
        CacheBackend::Redis => {
            info!(nodes = ?config.cache.nodes, "Using Redis course cache");
            Arc::new(RedisCourseCache::connect(config.cache.redis_config(), shutdown.clone()).await?)
        }
    };

    Ok(Arc::new(CachedCatalog::new(client, cache, config.cache.ttl())))
}

/// Review store plus the database connection backing it, if any.
pub async fn build_store(
    config: &AppConfig,
) -> Result<(Arc<dyn ReviewStore>, Option<DatabaseConnection>), BoxError> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory review store, reviews are lost on restart");
            Ok((Arc::new(InMemoryReviewStore::new()), None))
        }
        StoreBackend::Database => {
            let db = init_database(&config.database.database_config()).await?;
            Ok((Arc::new(SeaOrmReviewStore::new(db.clone())), Some(db)))
        }
    }
}

// ── Server handle ──────────────────────────────────────────────────

/// A running HTTP server
pub struct ServerHandle {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
    db: Option<DatabaseConnection>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the server to stop (after the shutdown signal fired).
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            error!("HTTP server task panicked: {}", e);
        }

        if let Some(db) = self.db {
            match db.close().await {
                Ok(()) => info!("✅ Database connection closed"),
                Err(e) => warn!("Error closing database connection: {}", e),
            }
        }
    }
}

async fn spawn_http(
    name: &'static str,
    address: &str,
    router: axum::Router,
    shutdown: ShutdownSignal,
) -> Result<(SocketAddr, JoinHandle<()>), BoxError> {
    let listener = TcpListener::bind(address).await?;
    let local_addr = listener.local_addr()?;
    info!("{} listening on http://{}", name, local_addr);

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown.wait().await;
        info!("🛑 {} received shutdown signal", name);
    });

    let task = tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("{} error: {}", name, e);
        }
    });
    Ok((local_addr, task))
}

/// Start the reviews service on `server.host:server.port`.
pub async fn start_reviews_server(
    config: &AppConfig,
    metrics: Option<PrometheusHandle>,
    shutdown: ShutdownSignal,
) -> Result<ServerHandle, BoxError> {
    let catalog = build_catalog(config, &shutdown).await?;
    let (store, db) = build_store(config).await?;
    let service = Arc::new(ReviewService::new(store, catalog));

    let state = ReviewsState::new(service, config.errors.normalizer());
    let router = create_reviews_router(state, metrics);

    let (local_addr, task) =
        spawn_http("Reviews API", &config.server.address(), router, shutdown).await?;
    info!("Swagger UI available at http://{}/swagger-ui/", local_addr);

    Ok(ServerHandle { local_addr, task, db })
}

/// Start the catalog service on `catalog_service.host:catalog_service.port`.
pub async fn start_catalog_server(
    config: &AppConfig,
    registry: Arc<CourseRegistry>,
    shutdown: ShutdownSignal,
) -> Result<ServerHandle, BoxError> {
    let router = create_catalog_router(CatalogState::new(registry));
    let (local_addr, task) = spawn_http(
        "Catalog API",
        &config.catalog_service.address(),
        router,
        shutdown,
    )
    .await?;

    Ok(ServerHandle {
        local_addr,
        task,
        db: None,
    })
}

/// Registry from `catalog_service.seed_file`, or empty when none is set.
pub fn load_registry(config: &AppConfig) -> Result<CourseRegistry, BoxError> {
    match &config.catalog_service.seed_file {
        Some(path) => Ok(CourseRegistry::load_seed(path)?),
        None => {
            warn!("No seed file configured, catalog starts empty");
            Ok(CourseRegistry::new())
        }
    }
}
