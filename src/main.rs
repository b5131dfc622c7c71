//! Notification server binary
//!
//! Configuration comes from the environment, see [`ServerConfig::from_env`].
//!
//! ```sh
//! BLOG_NOTIFY_BACKEND=memory RUST_LOG=blog_notify=debug blog-notify
//! curl -N 'http://localhost:5000/api/notifications/stream?userId=alice'
//! ```

use blog_notify::post::MemoryPostRepository;
use blog_notify::server::{BackendKind, NotifyServer, ServerConfig};
use blog_notify::subscription::MemoryBackend;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blog_notify=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(backend = %config.backend, bind = %config.bind_addr, "Starting");

    match config.backend {
        BackendKind::Elastic => {
            NotifyServer::connect(config)
                .await?
                .run_until(shutdown_signal())
                .await?
        }
        BackendKind::Memory => {
            NotifyServer::new(config, MemoryBackend::new(), MemoryPostRepository::new())
                .run_until(shutdown_signal())
                .await?
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
