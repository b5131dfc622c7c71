//! Connection handle and state types
//!
//! This module defines the per-connection writer stored in the registry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, error::SendTimeoutError};

use super::error::{RegistryError, WriteFailure};
use super::event::NotificationEvent;

/// Registry-assigned connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Registered, receiving pushes
    Open,
    /// Receiving side gone (terminal)
    Closed,
}

/// Writer side of one live push connection
///
/// Cheap to clone. Clones share the same outbound queue, so writes through
/// any clone land on the same connection in call order.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    user_id: Arc<str>,
    created_at: Instant,
    tx: mpsc::Sender<NotificationEvent>,
}

impl ConnectionHandle {
    pub(super) fn new(id: ConnectionId, user_id: Arc<str>, tx: mpsc::Sender<NotificationEvent>) -> Self {
        Self {
            id,
            user_id,
            created_at: Instant::now(),
            tx,
        }
    }

    /// Connection identifier
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Owning user
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// When the connection was opened
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        if self.tx.is_closed() {
            ConnectionState::Closed
        } else {
            ConnectionState::Open
        }
    }

    /// Queue `event` on this connection
    ///
    /// Waits at most `timeout` for queue space. Fails immediately if the
    /// receiving side is gone.
    pub async fn write(&self, event: NotificationEvent, timeout: Duration) -> Result<(), RegistryError> {
        self.tx
            .send_timeout(event, timeout)
            .await
            .map_err(|e| RegistryError::ConnectionWriteFailed {
                connection_id: self.id,
                reason: match e {
                    SendTimeoutError::Closed(_) => WriteFailure::Closed,
                    SendTimeoutError::Timeout(_) => WriteFailure::TimedOut,
                },
            })
    }
}
