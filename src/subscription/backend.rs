//! Backing store trait
//!
//! The subscription store is a thin layer over a document index. Anything
//! that can upsert and delete by composite key and answer exact-match
//! queries on either field can back it.

use std::future::Future;

use super::error::StoreError;
use super::record::Subscription;

/// Persistence for subscription records
///
/// Implementations may return duplicates or unsorted results; the store
/// normalizes them.
pub trait SubscriptionBackend: Send + Sync + 'static {
    /// Insert the pair, or do nothing if it already exists
    fn upsert(
        &self,
        subscription: &Subscription,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete the pair. Returns `false` if it did not exist.
    fn delete(
        &self,
        subscription: &Subscription,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Topics with a record for `user_id`
    fn topics_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Users with a record for `topic`
    fn users_for_topic(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;
}
