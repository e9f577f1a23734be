//! Redis-backed course cache
//!
//! One link per configured node. Keys are `"{prefix}:{course_id}"` holding the
//! JSON course summary with a server-side expiry. A node that is still
//! connecting or has missed its heartbeat deadline answers every read with a
//! miss and drops writes, so callers fall through to the catalog.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::future::try_join_all;
use redis::aio::{ConnectionManager, ConnectionManagerConfig, MultiplexedConnection};
use redis::{Cmd, FromRedisValue, RedisResult};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::routing::route_key;
use crate::domain::{CourseCache, CourseId, CourseSummary};
use crate::shared::ShutdownSignal;
use crate::support::errors::CacheError;

const MAX_CONNECT_BACKOFF: Duration = Duration::from_secs(30);
const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(10);

/// Redis cache settings
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Node URLs, e.g. `redis://cache-1:6379`
    pub nodes: Vec<String>,
    pub key_prefix: String,
    /// Bound on every single command
    pub invocation_timeout: Duration,
    pub heartbeat_interval: Duration,
    /// A node without a successful PING for this long is taken out of rotation
    pub heartbeat_timeout: Duration,
    pub socket_connect_timeout: Duration,
    /// Return from `connect` immediately and connect nodes in the background
    pub async_start: bool,
    /// Use a self-healing connection manager per node
    pub reconnect_on_failure: bool,
    /// Spread keys across nodes by key hash
    pub smart_routing: bool,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["redis://127.0.0.1:6379".to_string()],
            key_prefix: "courses".to_string(),
            invocation_timeout: Duration::from_secs(5),
            heartbeat_interval: Duration::from_millis(3_000),
            heartbeat_timeout: Duration::from_millis(30_000),
            socket_connect_timeout: Duration::from_secs(10),
            async_start: true,
            reconnect_on_failure: true,
            smart_routing: true,
        }
    }
}

// ── Node link ───────────────────────────────────────────────────

#[derive(Clone)]
enum Link {
    Managed(ConnectionManager),
    Direct(MultiplexedConnection),
}

impl Link {
    async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> RedisResult<T> {
        match self {
            Link::Managed(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            }
            Link::Direct(conn) => {
                let mut conn = conn.clone();
                cmd.query_async(&mut conn).await
            }
        }
    }

    async fn ping(&self) -> RedisResult<()> {
        let _pong: String = self.query(&redis::cmd("PING")).await?;
        Ok(())
    }
}

struct Node {
    url: String,
    link: OnceLock<Link>,
    healthy: AtomicBool,
}

impl Node {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            link: OnceLock::new(),
            healthy: AtomicBool::new(false),
        }
    }

    /// Link to use for a command, if the node is connected and healthy
    fn usable_link(&self) -> Option<&Link> {
        self.link
            .get()
            .filter(|_| self.healthy.load(Ordering::SeqCst))
    }

    async fn establish(&self, config: &RedisCacheConfig) -> Result<(), CacheError> {
        let client = redis::Client::open(self.url.as_str())?;
        let connect_timeout = config.socket_connect_timeout;
        let timed_out = || CacheError::Connect {
            node: self.url.clone(),
            reason: format!("no connection within {:?}", connect_timeout),
        };

        let link = if config.reconnect_on_failure {
            // Later reconnects run inside the manager and honor the same bound
            let manager_config = ConnectionManagerConfig::new().set_connection_timeout(connect_timeout);
            let manager = timeout(
                connect_timeout,
                ConnectionManager::new_with_config(client, manager_config),
            )
            .await
            .map_err(|_| timed_out())??;
            Link::Managed(manager)
        } else {
            let conn = timeout(connect_timeout, client.get_multiplexed_async_connection())
                .await
                .map_err(|_| timed_out())??;
            Link::Direct(conn)
        };

        let _ = self.link.set(link);
        self.healthy.store(true, Ordering::SeqCst);
        Ok(())
    }
}

async fn connect_in_background(node: Arc<Node>, config: RedisCacheConfig, shutdown: ShutdownSignal) {
    let mut delay = Duration::from_millis(500);
    loop {
        match node.establish(&config).await {
            Ok(()) => {
                info!(node = %node.url, "Cache node connected");
                return;
            }
            Err(err) => warn!(
                node = %node.url,
                error = %err,
                retry_in_ms = delay.as_millis() as u64,
                "Cache node not reachable yet, serving misses"
            ),
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.wait() => return,
        }
        delay = (delay * 2).min(MAX_CONNECT_BACKOFF);
    }
}

async fn run_heartbeat(nodes: Vec<Arc<Node>>, config: RedisCacheConfig, shutdown: ShutdownSignal) {
    let mut ticker = tokio::time::interval(config.heartbeat_interval.max(MIN_HEARTBEAT_INTERVAL));
    let mut last_ok: Vec<Option<Instant>> = vec![None; nodes.len()];

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.wait() => {
                debug!("Cache heartbeat stopped");
                return;
            }
        }

        for (node, last_ok) in nodes.iter().zip(last_ok.iter_mut()) {
            let Some(link) = node.link.get() else {
                continue;
            };

            match timeout(config.invocation_timeout, link.ping()).await {
                Ok(Ok(())) => {
                    *last_ok = Some(Instant::now());
                    if !node.healthy.swap(true, Ordering::SeqCst) {
                        info!(node = %node.url, "Cache node healthy again");
                    }
                }
                _ => {
                    let since = *last_ok.get_or_insert_with(Instant::now);
                    if since.elapsed() >= config.heartbeat_timeout
                        && node.healthy.swap(false, Ordering::SeqCst)
                    {
                        warn!(
                            node = %node.url,
                            heartbeat_timeout_ms = config.heartbeat_timeout.as_millis() as u64,
                            "Cache node missed heartbeat deadline, taken out of rotation"
                        );
                    }
                }
            }
        }
    }
}

// ── RedisCourseCache ────────────────────────────────────────────

pub struct RedisCourseCache {
    nodes: Vec<Arc<Node>>,
    config: RedisCacheConfig,
}

impl RedisCourseCache {
    /// Connect to every configured node and start the heartbeat.
    ///
    /// With `async_start` this returns before any node is connected. Background
    /// tasks stop when `shutdown` fires.
    pub async fn connect(config: RedisCacheConfig, shutdown: ShutdownSignal) -> Result<Self, CacheError> {
        if config.nodes.is_empty() {
            return Err(CacheError::Connect {
                node: "<none>".to_string(),
                reason: "no cache nodes configured".to_string(),
            });
        }

        let nodes: Vec<Arc<Node>> = config.nodes.iter().map(|url| Arc::new(Node::new(url))).collect();

        if config.async_start {
            for node in &nodes {
                tokio::spawn(connect_in_background(
                    Arc::clone(node),
                    config.clone(),
                    shutdown.clone(),
                ));
            }
            info!(nodes = nodes.len(), "Cache connecting in background");
        } else {
            try_join_all(nodes.iter().map(|node| node.establish(&config))).await?;
            info!(nodes = nodes.len(), "Cache connected");
        }

        tokio::spawn(run_heartbeat(nodes.clone(), config.clone(), shutdown));

        Ok(Self { nodes, config })
    }

    fn key(&self, id: CourseId) -> String {
        format!("{}:{}", self.config.key_prefix, id)
    }

    fn node_for(&self, key: &str) -> &Node {
        &self.nodes[route_key(key, self.nodes.len(), self.config.smart_routing)]
    }

    /// Number of nodes currently serving commands
    pub fn healthy_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.usable_link().is_some()).count()
    }

    async fn run<T: FromRedisValue>(&self, link: &Link, cmd: Cmd) -> Result<T, CacheError> {
        let limit = self.config.invocation_timeout;
        let value = timeout(limit, link.query(&cmd))
            .await
            .map_err(|_| CacheError::Timeout(limit))??;
        Ok(value)
    }
}

#[async_trait]
impl CourseCache for RedisCourseCache {
    async fn get(&self, id: CourseId) -> Result<Option<CourseSummary>, CacheError> {
        let key = self.key(id);
        let node = self.node_for(&key);
        let Some(link) = node.usable_link() else {
            debug!(node = %node.url, %key, "Cache node unavailable, treating as miss");
            return Ok(None);
        };

        let mut cmd = redis::cmd("GET");
        cmd.arg(&key);
        let raw: Option<String> = self.run(link, cmd).await?;
        Ok(raw.map(|json| serde_json::from_str::<CourseSummary>(&json)).transpose()?)
    }

    async fn put(&self, id: CourseId, value: &CourseSummary, ttl: Duration) -> Result<(), CacheError> {
        let key = self.key(id);
        let node = self.node_for(&key);
        let Some(link) = node.usable_link() else {
            debug!(node = %node.url, %key, "Cache node unavailable, dropping write");
            return Ok(());
        };

        let mut cmd = redis::cmd("SET");
        cmd.arg(&key)
            .arg(serde_json::to_string(value)?)
            .arg("EX")
            .arg(ttl.as_secs().max(1));
        let () = self.run(link, cmd).await?;
        Ok(())
    }

    async fn invalidate(&self, id: CourseId) -> Result<(), CacheError> {
        let key = self.key(id);
        let node = self.node_for(&key);
        let Some(link) = node.usable_link() else {
            return Err(CacheError::NotConnected(node.url.clone()));
        };

        let mut cmd = redis::cmd("DEL");
        cmd.arg(&key);
        let _removed: i64 = self.run(link, cmd).await?;
        Ok(())
    }
}
