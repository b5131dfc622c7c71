//! Notification server listener
//!
//! Binds the HTTP listener and serves the router until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::elastic::ElasticClient;
use crate::error::{Error, Result};
use crate::post::{ElasticPostRepository, PostRepository};
use crate::publisher::Publisher;
use crate::registry::ConnectionRegistry;
use crate::server::config::{ServerConfig, MIN_KEEP_ALIVE_INTERVAL};
use crate::server::routes::{router, AppState};
use crate::subscription::{ElasticBackend, StoreError, SubscriptionBackend, SubscriptionStore};

/// Notification server
pub struct NotifyServer<B, P> {
    config: ServerConfig,
    state: AppState<B, P>,
}

impl NotifyServer<ElasticBackend, ElasticPostRepository> {
    /// Create a server backed by the document index in `config`
    ///
    /// Creates the subscription index if it does not exist yet. A malformed
    /// index URL is reported as [`Error::Config`] before anything is sent.
    pub async fn connect(config: ServerConfig) -> Result<Self> {
        let client = ElasticClient::new(&config.elastic_url, config.store_timeout).map_err(
            |e| match e {
                StoreError::InvalidInput(msg) => Error::Config(msg),
                other => Error::Store(other),
            },
        )?;

        let backend = ElasticBackend::new(client.clone(), config.subscription_index.clone());
        backend.init().await?;

        let posts = ElasticPostRepository::new(client, config.post_index.clone());

        tracing::info!(
            url = %config.elastic_url,
            subscription_index = %config.subscription_index,
            post_index = %config.post_index,
            "Connected to document index"
        );

        Ok(Self::new(config, backend, posts))
    }
}

impl<B, P> NotifyServer<B, P>
where
    B: SubscriptionBackend,
    P: PostRepository,
{
    /// Create a new server with the given configuration and storage
    pub fn new(config: ServerConfig, backend: B, posts: P) -> Self {
        let registry = Arc::new(ConnectionRegistry::with_config(config.registry.clone()));
        let store = Arc::new(SubscriptionStore::new(backend));
        let publisher = Arc::new(Publisher::new(store, registry));

        let state = AppState {
            publisher,
            posts: Arc::new(posts),
            keep_alive_interval: config.keep_alive_interval.max(MIN_KEEP_ALIVE_INTERVAL),
        };

        Self { config, state }
    }

    /// Get a reference to the connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        self.state.publisher.registry()
    }

    /// Get a reference to the publisher
    pub fn publisher(&self) -> &Arc<Publisher<B>> {
        &self.state.publisher
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Run the server
    ///
    /// This method blocks until the listener fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    ///
    /// When `shutdown` completes every notification stream is closed, which
    /// lets the open SSE responses finish so the server can drain.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, "Notification server listening");

        let registry = Arc::clone(self.registry());
        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
                registry.close_all();
            })
            .await;

        self.registry().close_all();

        if let Err(ref e) = result {
            tracing::error!(error = %e, "Server error");
        }
        result.map_err(Into::into)
    }
}
