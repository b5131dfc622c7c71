//! Crate-wide error type

use crate::subscription::StoreError;

/// Result alias used by server and setup paths
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Debug)]
pub enum Error {
    /// Socket or listener failure
    Io(std::io::Error),
    /// Subscription store failure
    Store(StoreError),
    /// Invalid configuration
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Store(e) => write!(f, "Subscription store error: {}", e),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Store(e) => Some(e),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}
