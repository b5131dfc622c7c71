//! Subscription store
//!
//! Query/update layer over a [`SubscriptionBackend`]. Every call goes to the
//! backend; there is no cache.

use std::collections::BTreeSet;

use super::backend::SubscriptionBackend;
use super::error::StoreError;
use super::record::Subscription;

/// Durable (user, topic) subscriptions
pub struct SubscriptionStore<B> {
    backend: B,
}

impl<B: SubscriptionBackend> SubscriptionStore<B> {
    /// Create a store over `backend`
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Subscribe `user_id` to `topic`
    ///
    /// Idempotent: subscribing an existing pair succeeds without change.
    pub async fn subscribe(&self, user_id: &str, topic: &str) -> Result<Subscription, StoreError> {
        let subscription = validated(user_id, topic)?;

        self.backend.upsert(&subscription).await?;

        tracing::info!(
            user_id = %subscription.user_id,
            topic = %subscription.topic,
            "Subscribed"
        );

        Ok(subscription)
    }

    /// Remove the `user_id` / `topic` pair
    ///
    /// Returns `NotFound` if the pair was not subscribed.
    pub async fn unsubscribe(&self, user_id: &str, topic: &str) -> Result<(), StoreError> {
        let subscription = validated(user_id, topic)?;

        if !self.backend.delete(&subscription).await? {
            tracing::debug!(
                user_id = %subscription.user_id,
                topic = %subscription.topic,
                "Unsubscribe of unknown pair"
            );
            return Err(StoreError::NotFound {
                user_id: subscription.user_id,
                topic: subscription.topic,
            });
        }

        tracing::info!(
            user_id = %subscription.user_id,
            topic = %subscription.topic,
            "Unsubscribed"
        );

        Ok(())
    }

    /// Topics `user_id` subscribes to, sorted; empty for an unknown user
    pub async fn list_topics_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Ok(Vec::new());
        }

        let topics = self.backend.topics_for_user(user_id).await?;
        Ok(normalize(topics))
    }

    /// Users subscribed to `topic`, sorted; empty if none
    pub async fn list_users_for_topic(&self, topic: &str) -> Result<Vec<String>, StoreError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.backend.users_for_topic(topic).await?;
        Ok(normalize(users))
    }
}

fn validated(user_id: &str, topic: &str) -> Result<Subscription, StoreError> {
    let user_id = user_id.trim();
    let topic = topic.trim();

    if user_id.is_empty() {
        return Err(StoreError::InvalidInput("userId must not be empty".into()));
    }
    if topic.is_empty() {
        return Err(StoreError::InvalidInput("topic must not be empty".into()));
    }

    Ok(Subscription::new(user_id, topic))
}

fn normalize(values: Vec<String>) -> Vec<String> {
    values.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;
    use crate::subscription::MemoryBackend;

    fn store() -> SubscriptionStore<MemoryBackend> {
        SubscriptionStore::new(MemoryBackend::new())
    }

    #[tokio::test]
    async fn test_subscribe_visible_both_ways() {
        let store = store();

        store.subscribe("alice", "Sports").await.unwrap();

        assert_eq!(store.list_topics_for_user("alice").await.unwrap(), vec!["Sports"]);
        assert_eq!(store.list_users_for_topic("Sports").await.unwrap(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_subscribe_twice_single_occurrence() {
        let store = store();

        assert_ok!(store.subscribe("alice", "Sports").await);
        assert_ok!(store.subscribe("alice", "Sports").await);

        let topics = store.list_topics_for_user("alice").await.unwrap();
        assert_eq!(topics.iter().filter(|t| *t == "Sports").count(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_topic() {
        let store = store();

        store.subscribe("alice", "Sports").await.unwrap();
        store.subscribe("alice", "Health").await.unwrap();
        store.unsubscribe("alice", "Sports").await.unwrap();

        assert_eq!(store.list_topics_for_user("alice").await.unwrap(), vec!["Health"]);
        assert!(store.list_users_for_topic("Sports").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_pair_not_found() {
        let store = store();

        let result = store.unsubscribe("alice", "Sports").await;
        assert_eq!(
            result,
            Err(StoreError::NotFound {
                user_id: "alice".into(),
                topic: "Sports".into()
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_topics() {
        let store = store();

        assert!(store.list_topics_for_user("nobody").await.unwrap().is_empty());
        assert!(store.list_users_for_topic("Travel").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_input_rejected() {
        let store = store();

        assert!(matches!(
            store.subscribe("  ", "Sports").await,
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            store.subscribe("alice", "").await,
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_input_is_trimmed() {
        let store = store();

        store.subscribe(" alice ", " Sports").await.unwrap();
        assert_eq!(store.list_users_for_topic("Sports").await.unwrap(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_unavailable_backend_surfaces() {
        let store = store();
        store.backend().set_available(false);

        let result = store.subscribe("alice", "Sports").await;
        assert!(matches!(result, Err(ref e) if e.is_retryable()));
    }
}
