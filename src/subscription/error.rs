//! Subscription store error types

/// Error type for subscription store operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backing index could not be reached (retryable)
    Unavailable(String),
    /// Unsubscribe of a pair that was never subscribed
    NotFound { user_id: String, topic: String },
    /// Blank user id or topic
    InvalidInput(String),
    /// Backing index answered with something we could not use
    Backend(String),
}

impl StoreError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "Store unavailable: {}", reason),
            StoreError::NotFound { user_id, topic } => {
                write!(f, "Subscription not found: {} -> {}", user_id, topic)
            }
            StoreError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            StoreError::Backend(msg) => write!(f, "Store backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
