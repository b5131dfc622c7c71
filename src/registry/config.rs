//! Registry configuration

use std::time::Duration;

/// Configuration for the connection registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum open connections across all users (0 = unlimited)
    pub max_connections: usize,

    /// Maximum open connections for a single user (0 = unlimited)
    pub max_connections_per_user: usize,

    /// Outbound queue depth per connection
    pub channel_capacity: usize,

    /// How long a write may wait on a full queue before the connection is dropped
    pub write_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_connections: 0,
            max_connections_per_user: 0,
            channel_capacity: 64,
            write_timeout: Duration::from_secs(5),
        }
    }
}

impl RegistryConfig {
    /// Set the global connection limit
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the per-user connection limit
    pub fn max_connections_per_user(mut self, max: usize) -> Self {
        self.max_connections_per_user = max;
        self
    }

    /// Set the per-connection queue depth (at least 1)
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Set the write timeout
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.max_connections, 0);
        assert_eq!(config.max_connections_per_user, 0);
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.write_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_channel_capacity_floor() {
        let config = RegistryConfig::default().channel_capacity(0);
        assert_eq!(config.channel_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default()
            .max_connections(100)
            .max_connections_per_user(4)
            .write_timeout(Duration::from_millis(250));

        assert_eq!(config.max_connections, 100);
        assert_eq!(config.max_connections_per_user, 4);
        assert_eq!(config.write_timeout, Duration::from_millis(250));
    }
}
