//! Connection registry for live notification streams
//!
//! The registry tracks every open push connection, keyed by user. Each
//! connection owns a bounded mpsc queue: the publisher writes into it, and
//! the connection's outbound task (the SSE response body) drains it to the
//! socket. A slow client only ever fills its own queue.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<ConnectionRegistry>
//!                   ┌──────────────────────────────┐
//!                   │ connections: HashMap<UserId, │
//!                   │   Vec<ConnectionHandle {     │
//!                   │     id, created_at,          │
//!                   │     tx: mpsc::Sender,        │
//!                   │   }>                         │
//!                   │ >                            │
//!                   └──────────────┬───────────────┘
//!                                  │
//!         ┌────────────────────────┼────────────────────────┐
//!         │                        │                        │
//!         ▼                        ▼                        ▼
//!    [Publisher]             [EventStream]            [EventStream]
//!    connections_for()       rx.recv()                rx.recv()
//!         │                        │                        │
//!         └──► handle.write() ─────┴──► SSE body ──► TCP ───┘
//! ```
//!
//! # Lifecycle
//!
//! `register` → `Open` → (`EventStream` dropped | `deregister` | `close_all`)
//! → `Closed`. There is no resume: a reconnecting client gets a brand new
//! connection and nothing it missed.

pub mod config;
pub mod entry;
pub mod error;
pub mod event;
pub mod store;
pub mod stream;

pub use config::RegistryConfig;
pub use entry::{ConnectionHandle, ConnectionId, ConnectionState};
pub use error::{RegistryError, WriteFailure};
pub use event::NotificationEvent;
pub use store::ConnectionRegistry;
pub use stream::EventStream;
