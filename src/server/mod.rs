//! HTTP server
//!
//! Wires the subscription store, connection registry and publisher into an
//! axum router and serves it.

pub mod config;
pub mod error;
pub mod listener;
pub mod routes;

pub use config::{BackendKind, ServerConfig};
pub use error::ApiError;
pub use listener::NotifyServer;
pub use routes::{router, AppState};
