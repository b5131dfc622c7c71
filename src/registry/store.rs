//! Connection registry implementation
//!
//! Process-wide map from user id to that user's open push connections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;

use crate::stats::RegistryStats;

use super::config::RegistryConfig;
use super::entry::{ConnectionHandle, ConnectionId};
use super::error::RegistryError;
use super::stream::EventStream;

/// Registry of live push connections
///
/// A single `RwLock` guards the whole map. Critical sections never await:
/// register/deregister insert or remove one handle, and readers clone the
/// handles out before writing to them. Locking is synchronous so that a
/// dropped [`EventStream`] can deregister itself from `Drop`.
pub struct ConnectionRegistry {
    /// Map of user id to that user's open connections
    connections: RwLock<HashMap<Arc<str>, Vec<ConnectionHandle>>>,

    /// Total open connections across all users
    total: AtomicU64,

    next_id: AtomicU64,

    config: RegistryConfig,
}

impl ConnectionRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            total: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Open a new connection for `user_id`
    ///
    /// The returned stream yields every event written to the connection.
    /// Fails only when a configured connection limit is reached.
    pub fn register(self: &Arc<Self>, user_id: &str) -> Result<EventStream, RegistryError> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let (user_id, user_count) = {
            let mut connections = self.write_map();

            let total = self.total.load(Ordering::Relaxed) as usize;
            if self.config.max_connections > 0 && total >= self.config.max_connections {
                tracing::warn!(
                    user_id = user_id,
                    limit = self.config.max_connections,
                    "Connection rejected: limit reached"
                );
                return Err(RegistryError::CapacityExceeded {
                    limit: self.config.max_connections,
                });
            }

            let user_id: Arc<str> = match connections.get_key_value(user_id) {
                Some((key, _)) => Arc::clone(key),
                None => Arc::from(user_id),
            };
            let bucket = connections.entry(Arc::clone(&user_id)).or_default();

            if self.config.max_connections_per_user > 0
                && bucket.len() >= self.config.max_connections_per_user
            {
                tracing::warn!(
                    user_id = %user_id,
                    limit = self.config.max_connections_per_user,
                    "Connection rejected: per-user limit reached"
                );
                return Err(RegistryError::UserCapacityExceeded {
                    user_id: user_id.to_string(),
                    limit: self.config.max_connections_per_user,
                });
            }

            bucket.push(ConnectionHandle::new(id, Arc::clone(&user_id), tx));
            self.total.fetch_add(1, Ordering::Relaxed);
            (user_id, bucket.len())
        };

        tracing::info!(
            user_id = %user_id,
            connection_id = %id,
            user_connections = user_count,
            "Connection registered"
        );

        Ok(EventStream::new(id, user_id, rx, Arc::clone(self)))
    }

    /// Remove `handle` from its owner's connection set
    ///
    /// Idempotent: returns `false` if the connection was already gone.
    pub fn deregister(&self, handle: &ConnectionHandle) -> bool {
        self.remove(handle.user_id(), handle.id())
    }

    pub(super) fn remove(&self, user_id: &str, id: ConnectionId) -> bool {
        let remaining = {
            let mut connections = self.write_map();

            let Some(bucket) = connections.get_mut(user_id) else {
                return false;
            };
            let Some(pos) = bucket.iter().position(|c| c.id() == id) else {
                return false;
            };

            bucket.swap_remove(pos);
            self.total.fetch_sub(1, Ordering::Relaxed);

            let remaining = bucket.len();
            if remaining == 0 {
                connections.remove(user_id);
            }
            remaining
        };

        tracing::info!(
            user_id = user_id,
            connection_id = %id,
            user_connections = remaining,
            "Connection deregistered"
        );

        true
    }

    /// Snapshot of the open connections for `user_id`
    ///
    /// Empty for an unknown or disconnected user.
    pub fn connections_for(&self, user_id: &str) -> Vec<ConnectionHandle> {
        self.read_map().get(user_id).cloned().unwrap_or_default()
    }

    /// Number of open connections for `user_id`
    pub fn connection_count(&self, user_id: &str) -> usize {
        self.read_map().get(user_id).map_or(0, Vec::len)
    }

    /// Total open connections
    pub fn total_connections(&self) -> usize {
        self.total.load(Ordering::Relaxed) as usize
    }

    /// Registry statistics
    pub fn stats(&self) -> RegistryStats {
        let connections = self.read_map();
        RegistryStats {
            users: connections.len(),
            connections: connections.values().map(Vec::len).sum(),
        }
    }

    /// Drop every connection
    ///
    /// Streams end after delivering what is already queued. Used on shutdown.
    pub fn close_all(&self) {
        let drained: Vec<_> = {
            let mut connections = self.write_map();
            self.total.store(0, Ordering::Relaxed);
            connections.drain().collect()
        };

        let count: usize = drained.iter().map(|(_, bucket)| bucket.len()).sum();
        tracing::info!(connections = count, "All connections closed");
    }

    fn read_map(&self) -> RwLockReadGuard<'_, HashMap<Arc<str>, Vec<ConnectionHandle>>> {
        self.connections.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, HashMap<Arc<str>, Vec<ConnectionHandle>>> {
        self.connections.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
