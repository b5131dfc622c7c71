//! Real-time category notifications for a student blogging backend
//!
//! Users subscribe to post categories. While they have the site open, each
//! browser tab holds a server-sent-events stream. When someone creates a
//! post, every open stream of every user subscribed to the post's category
//! receives a `{category, title, message}` event.
//!
//! Delivery is best-effort: no persistence, acknowledgement, retry or replay.
//!
//! # Components
//!
//! - [`subscription`]: durable (user, topic) pairs kept in the document index
//! - [`registry`]: in-memory map of users to their open push connections
//! - [`publisher`]: fan-out from a new post to matching connections
//! - [`server`]: HTTP endpoints and SSE transport
//!
//! # Example
//!
//! ```no_run
//! use blog_notify::post::MemoryPostRepository;
//! use blog_notify::server::{NotifyServer, ServerConfig};
//! use blog_notify::subscription::MemoryBackend;
//!
//! # async fn example() -> blog_notify::Result<()> {
//! let server = NotifyServer::new(
//!     ServerConfig::default(),
//!     MemoryBackend::new(),
//!     MemoryPostRepository::new(),
//! );
//! server.run().await
//! # }
//! ```

pub mod elastic;
pub mod error;
pub mod post;
pub mod publisher;
pub mod registry;
pub mod server;
pub mod stats;
pub mod subscription;

pub use error::{Error, Result};
pub use post::Post;
pub use publisher::Publisher;
pub use registry::{ConnectionRegistry, NotificationEvent, RegistryConfig};
pub use server::{NotifyServer, ServerConfig};
pub use subscription::{Subscription, SubscriptionStore};
