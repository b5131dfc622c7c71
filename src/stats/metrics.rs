//! Statistics for notification delivery

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Connection registry statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Users with at least one open connection
    pub users: usize,
    /// Open connections across all users
    pub connections: usize,
}

/// Outcome of a single publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Users subscribed to the post's category
    pub subscribers: usize,
    /// Live connections those users had
    pub connections: usize,
    /// Events queued successfully
    pub delivered: usize,
    /// Writes that failed (connection dropped)
    pub failed: usize,
}

/// Cumulative publisher counters
#[derive(Debug, Default)]
pub struct PublisherStats {
    posts_published: AtomicU64,
    events_delivered: AtomicU64,
    writes_failed: AtomicU64,
    store_failures: AtomicU64,
}

/// Point-in-time copy of [`PublisherStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublisherSnapshot {
    pub posts_published: u64,
    pub events_delivered: u64,
    pub writes_failed: u64,
    pub store_failures: u64,
}

impl PublisherStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one publish into the counters
    pub fn record(&self, report: &PublishReport) {
        self.posts_published.fetch_add(1, Ordering::Relaxed);
        self.events_delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.writes_failed
            .fetch_add(report.failed as u64, Ordering::Relaxed);
    }

    /// Count a subscriber lookup that failed
    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PublisherSnapshot {
        PublisherSnapshot {
            posts_published: self.posts_published.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publisher_stats_new() {
        let stats = PublisherStats::new();
        assert_eq!(stats.snapshot(), PublisherSnapshot::default());
    }

    #[test]
    fn test_publisher_stats_record() {
        let stats = PublisherStats::new();

        stats.record(&PublishReport {
            subscribers: 2,
            connections: 3,
            delivered: 2,
            failed: 1,
        });
        stats.record(&PublishReport::default());
        stats.record_store_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.posts_published, 2);
        assert_eq!(snapshot.events_delivered, 2);
        assert_eq!(snapshot.writes_failed, 1);
        assert_eq!(snapshot.store_failures, 1);
    }

    #[test]
    fn test_registry_stats_json() {
        let stats = RegistryStats {
            users: 1,
            connections: 2,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"users":1,"connections":2}"#);
    }
}
