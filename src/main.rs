//! Reviews service
//!
//! REST API for course reviews. Every new review is checked against the
//! remote course catalog before it is stored. Reads configuration from a TOML
//! file (`REVIEWS_CONFIG`, default ~/.config/course-reviews/config.toml).

use course_reviews::server::{
    config_path_from_env, load_config_and_init_tracing, start_reviews_server, BoxError,
};
use course_reviews::shared::{listen_for_shutdown_signals, ShutdownSignal};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config_path = config_path_from_env("REVIEWS_CONFIG");
    let config = load_config_and_init_tracing(&config_path);

    info!("Starting course reviews service...");

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    info!("📊 Prometheus metrics recorder installed");

    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    let server = start_reviews_server(&config, Some(prometheus_handle), shutdown).await?;
    info!("🚀 Reviews service started on {}", server.local_addr());

    server.wait().await;
    info!("👋 Reviews service shutdown complete");
    Ok(())
}
