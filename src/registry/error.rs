//! Registry error types
//!
//! Error types for connection registry operations.

use super::entry::ConnectionId;

/// Why a write to a connection did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// The receiving side is gone
    Closed,
    /// The outbound queue stayed full for the whole write timeout
    TimedOut,
}

impl std::fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteFailure::Closed => write!(f, "connection closed"),
            WriteFailure::TimedOut => write!(f, "write timed out"),
        }
    }
}

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Global connection limit reached
    CapacityExceeded { limit: usize },
    /// Per-user connection limit reached
    UserCapacityExceeded { user_id: String, limit: usize },
    /// Delivery to a single connection failed
    ConnectionWriteFailed {
        connection_id: ConnectionId,
        reason: WriteFailure,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::CapacityExceeded { limit } => {
                write!(f, "Connection limit reached ({})", limit)
            }
            RegistryError::UserCapacityExceeded { user_id, limit } => {
                write!(f, "Connection limit reached for {} ({})", user_id, limit)
            }
            RegistryError::ConnectionWriteFailed {
                connection_id,
                reason,
            } => write!(f, "Write to connection {} failed: {}", connection_id, reason),
        }
    }
}

impl std::error::Error for RegistryError {}
