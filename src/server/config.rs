//! Server configuration

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::post::POST_INDEX;
use crate::registry::RegistryConfig;
use crate::subscription::SUBSCRIPTION_INDEX;

/// Shortest SSE keep-alive interval accepted
pub const MIN_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(1);

/// Where subscriptions and posts are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Elasticsearch-compatible document index
    Elastic,
    /// Process memory (lost on restart)
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elastic" | "elasticsearch" => Ok(BackendKind::Elastic),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Storage backend
    pub backend: BackendKind,

    /// Base URL of the document index
    pub elastic_url: String,

    /// Index holding subscriptions
    pub subscription_index: String,

    /// Index holding posts
    pub post_index: String,

    /// Per-request timeout for index calls
    pub store_timeout: Duration,

    /// Interval between SSE keep-alive comments (at least one second)
    pub keep_alive_interval: Duration,

    /// Connection registry settings
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            backend: BackendKind::Elastic,
            elastic_url: "http://localhost:9200".into(),
            subscription_index: SUBSCRIPTION_INDEX.into(),
            post_index: POST_INDEX.into(),
            store_timeout: Duration::from_secs(5),
            keep_alive_interval: Duration::from_secs(15),
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from `BLOG_NOTIFY_*` / `ELASTICSEARCH_URL` environment variables
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let registry = defaults.registry.clone();
        let keep_alive_interval = Duration::from_secs(env_or(
            "BLOG_NOTIFY_KEEP_ALIVE_SECS",
            defaults.keep_alive_interval.as_secs(),
        ));

        Self {
            bind_addr: env_or("BLOG_NOTIFY_BIND", defaults.bind_addr),
            backend: env_or("BLOG_NOTIFY_BACKEND", defaults.backend),
            elastic_url: env_or("ELASTICSEARCH_URL", defaults.elastic_url),
            subscription_index: env_or("BLOG_NOTIFY_SUBSCRIPTION_INDEX", defaults.subscription_index),
            post_index: env_or("BLOG_NOTIFY_POST_INDEX", defaults.post_index),
            store_timeout: Duration::from_millis(env_or(
                "BLOG_NOTIFY_STORE_TIMEOUT_MS",
                defaults.store_timeout.as_millis() as u64,
            )),
            keep_alive_interval: defaults.keep_alive_interval,
            registry: RegistryConfig::default()
                .max_connections(env_or("BLOG_NOTIFY_MAX_CONNECTIONS", registry.max_connections))
                .max_connections_per_user(env_or(
                    "BLOG_NOTIFY_MAX_CONNECTIONS_PER_USER",
                    registry.max_connections_per_user,
                ))
                .channel_capacity(env_or("BLOG_NOTIFY_CHANNEL_CAPACITY", registry.channel_capacity))
                .write_timeout(Duration::from_millis(env_or(
                    "BLOG_NOTIFY_WRITE_TIMEOUT_MS",
                    registry.write_timeout.as_millis() as u64,
                ))),
        }
        .keep_alive_interval(keep_alive_interval)
    }

    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the storage backend
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the document index URL
    pub fn elastic_url(mut self, url: impl Into<String>) -> Self {
        self.elastic_url = url.into();
        self
    }

    /// Set the index call timeout
    pub fn store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Set the SSE keep-alive interval (at least one second)
    pub fn keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval.max(MIN_KEEP_ALIVE_INTERVAL);
        self
    }

    /// Set the registry configuration
    pub fn registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = key, value = %raw, error = %e, default = %default, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Elastic => write!(f, "elastic"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}
