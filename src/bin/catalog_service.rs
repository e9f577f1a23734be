//! Course catalog service
//!
//! Serves course summaries from an in-memory registry seeded from JSON.
//! Shares the reviews service config file (`[catalog_service]` section);
//! the path comes from `CATALOG_CONFIG`, then `REVIEWS_CONFIG`.

use std::sync::Arc;

use course_reviews::server::{
    config_path_from_env, load_config_and_init_tracing, load_registry, start_catalog_server,
    BoxError,
};
use course_reviews::shared::{listen_for_shutdown_signals, ShutdownSignal};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config_path = match std::env::var("CATALOG_CONFIG") {
        Ok(path) => path.into(),
        Err(_) => config_path_from_env("REVIEWS_CONFIG"),
    };
    let config = load_config_and_init_tracing(&config_path);

    info!("Starting course catalog service...");
    let registry = Arc::new(load_registry(&config)?);
    info!(courses = registry.len(), "Course registry ready");

    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    let server = start_catalog_server(&config, registry, shutdown).await?;
    server.wait().await;
    info!("👋 Catalog service shutdown complete");
    Ok(())
}
