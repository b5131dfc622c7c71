//! In-memory subscription backend
//!
//! Used by tests and by the `memory` server backend for local development.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::backend::SubscriptionBackend;
use super::error::StoreError;
use super::record::Subscription;

/// Subscription backend held entirely in process memory
#[derive(Debug)]
pub struct MemoryBackend {
    records: RwLock<BTreeSet<Subscription>>,
    available: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeSet::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backing index going away (or coming back)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no records are stored
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory backend disabled".into()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionBackend for MemoryBackend {
    async fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        self.check_available()?;
        self.records.write().await.insert(subscription.clone());
        Ok(())
    }

    async fn delete(&self, subscription: &Subscription) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.records.write().await.remove(subscription))
    }

    async fn topics_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.topic.clone())
            .collect())
    }

    async fn users_for_topic(&self, topic: &str) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|s| s.topic == topic)
            .map(|s| s.user_id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let backend = MemoryBackend::new();
        let sub = Subscription::new("alice", "Sports");

        assert_ok!(backend.upsert(&sub).await);
        assert_ok!(backend.upsert(&sub).await);

        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let backend = MemoryBackend::new();
        let sub = Subscription::new("alice", "Sports");

        backend.upsert(&sub).await.unwrap();
        assert!(backend.delete(&sub).await.unwrap());
        assert!(!backend.delete(&sub).await.unwrap());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let backend = MemoryBackend::new();
        backend.set_available(false);

        let result = backend.topics_for_user("alice").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_err!(backend.upsert(&Subscription::new("alice", "Sports")).await);

        backend.set_available(true);
        assert_ok!(backend.topics_for_user("alice").await);
    }
}
