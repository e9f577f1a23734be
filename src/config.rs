//! Configuration module
//!
//! Both binaries read one TOML file. Every section and field has a default,
//! so a partial file (or none at all) is valid.
//!
//! ```toml
//! [catalog]
//! base_url = "http://catalog.internal:8080"
//!
//! [cache]
//! backend = "redis"
//! nodes = ["redis://cache-1:6379", "redis://cache-2:6379"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::errors::ErrorNormalizer;
use crate::infrastructure::cache::RedisCacheConfig;
use crate::infrastructure::catalog::LookupPolicy;
use crate::infrastructure::database::DatabaseConfig;
use crate::shared::RetryConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Longest cache TTL accepted (30 days)
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Default config location: `~/.config/course-reviews/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("course-reviews")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    pub database: DatabaseSection,
    pub errors: ErrorsConfig,
    pub logging: LoggingConfig,
    pub catalog_service: CatalogServiceConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the runtime cannot honor: zero durations, a connect
    /// timeout the call timeout would always preempt, out-of-range TTLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = &self.catalog;
        positive("catalog.call_timeout_secs", catalog.call_timeout_secs)?;
        positive("catalog.connect_timeout_secs", catalog.connect_timeout_secs)?;
        if catalog.connect_timeout_secs > catalog.call_timeout_secs {
            return Err(ConfigError::Invalid {
                field: "catalog.connect_timeout_secs",
                reason: format!(
                    "{} exceeds catalog.call_timeout_secs ({})",
                    catalog.connect_timeout_secs, catalog.call_timeout_secs
                ),
            });
        }

        let cache = &self.cache;
        positive("cache.ttl_secs", cache.ttl_secs)?;
        if cache.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::Invalid {
                field: "cache.ttl_secs",
                reason: format!("{} exceeds the maximum of {}", cache.ttl_secs, MAX_CACHE_TTL_SECS),
            });
        }
        positive("cache.invocation_timeout_secs", cache.invocation_timeout_secs)?;
        positive("cache.heartbeat_interval_ms", cache.heartbeat_interval_ms)?;
        positive("cache.heartbeat_timeout_ms", cache.heartbeat_timeout_ms)?;
        positive("cache.socket_connect_timeout_secs", cache.socket_connect_timeout_secs)?;
        Ok(())
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

fn positive(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Review service HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

/// Remote course catalog client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub call_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub keepalive_secs: u64,
    /// Retries on transient transport errors; capped at one.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            call_timeout_secs: 5,
            connect_timeout_secs: 2,
            keepalive_secs: 3,
            max_retries: 1,
            retry_delay_ms: 100,
        }
    }
}

impl CatalogConfig {
    pub fn lookup_policy(&self) -> LookupPolicy {
        let retry = if self.max_retries == 0 {
            RetryConfig::none()
        } else {
            RetryConfig::single_retry(Duration::from_millis(self.retry_delay_ms))
        };
        LookupPolicy {
            call_timeout: Duration::from_secs(self.call_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            keepalive: Duration::from_secs(self.keepalive_secs),
            retry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

/// Course cache in front of the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub backend: CacheBackend,
    pub nodes: Vec<String>,
    pub key_prefix: String,
    pub ttl_secs: u64,
    pub invocation_timeout_secs: u64,
    pub heartbeat_interval_ms: u64,
    pub heartbeat_timeout_ms: u64,
    pub socket_connect_timeout_secs: u64,
    pub async_start: bool,
    pub reconnect_on_failure: bool,
    pub smart_routing: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::Memory,
            nodes: vec!["redis://127.0.0.1:6379".to_string()],
            key_prefix: "courses".to_string(),
            ttl_secs: 300,
            invocation_timeout_secs: 5,
            heartbeat_interval_ms: 3_000,
            heartbeat_timeout_ms: 30_000,
            socket_connect_timeout_secs: 10,
            async_start: true,
            reconnect_on_failure: true,
            smart_routing: true,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn redis_config(&self) -> RedisCacheConfig {
        RedisCacheConfig {
            nodes: self.nodes.clone(),
            key_prefix: self.key_prefix.clone(),
            invocation_timeout: Duration::from_secs(self.invocation_timeout_secs),
            heartbeat_interval: Duration::from_millis(self.heartbeat_interval_ms),
            heartbeat_timeout: Duration::from_millis(self.heartbeat_timeout_ms),
            socket_connect_timeout: Duration::from_secs(self.socket_connect_timeout_secs),
            async_start: self.async_start,
            reconnect_on_failure: self.reconnect_on_failure,
            smart_routing: self.smart_routing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Database,
    Memory,
}

/// Review store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            backend: StoreBackend::Database,
            url: db.url,
            max_connections: db.max_connections,
        }
    }
}

impl DatabaseSection {
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
        }
    }
}

/// Error normalization policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorsConfig {
    /// Surface a catalog outage as UNREACHABLE instead of folding it into
    /// the course NOT_FOUND answer.
    pub expose_catalog_outage: bool,
}

impl ErrorsConfig {
    pub fn normalizer(&self) -> ErrorNormalizer {
        ErrorNormalizer::new().expose_catalog_outage(self.expose_catalog_outage)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Catalog service (the remote side) listener and seed data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogServiceConfig {
    pub host: String,
    pub port: u16,
    /// JSON array of course summaries loaded at startup
    pub seed_file: Option<PathBuf>,
}

impl CatalogServiceConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for CatalogServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            seed_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.catalog.call_timeout_secs, 5);
        assert_eq!(cfg.cache.backend, CacheBackend::Memory);
        assert!(cfg.cache.async_start);
        assert!(!cfg.errors.expose_catalog_outage);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [cache]
            backend = "redis"
            nodes = ["redis://a:6379", "redis://b:6379"]
            smart_routing = false

            [database]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.cache.backend, CacheBackend::Redis);
        assert_eq!(cfg.cache.nodes.len(), 2);
        assert_eq!(cfg.cache.ttl_secs, 300);
        assert!(!cfg.cache.redis_config().smart_routing);
        assert_eq!(cfg.database.backend, StoreBackend::Memory);
    }

    #[test]
    fn lookup_policy_caps_retries_at_one() {
        let mut catalog = CatalogConfig::default();
        catalog.max_retries = 5;
        assert_eq!(catalog.lookup_policy().retry.max_attempts, 2);

        catalog.max_retries = 0;
        assert_eq!(catalog.lookup_policy().retry.max_attempts, 1);
        assert_eq!(catalog.lookup_policy().call_timeout, Duration::from_secs(5));
    }

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_heartbeat_interval_is_rejected() {
        let cfg = AppConfig::from_toml("[cache]\nheartbeat_interval_ms = 0").unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "cache.heartbeat_interval_ms", .. })
        ));
    }

    #[test]
    fn oversized_ttl_is_rejected() {
        let cfg = AppConfig::from_toml("[cache]\nttl_secs = 9223372036854775807").unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "cache.ttl_secs", .. })
        ));
    }

    #[test]
    fn connect_timeout_must_fit_in_call_timeout() {
        let cfg = AppConfig::from_toml("[catalog]\ncall_timeout_secs = 5\nconnect_timeout_secs = 10")
            .unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "catalog.connect_timeout_secs", .. })
        ));
    }

    #[test]
    fn invalid_file_fails_to_load() {
        let path = std::env::temp_dir().join(format!("course-reviews-{}.toml", std::process::id()));
        std::fs::write(&path, "[cache]\nheartbeat_interval_ms = 0\n").unwrap();
        let result = AppConfig::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
