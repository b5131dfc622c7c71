//! Search-index subscription backend
//!
//! Each subscription is one document `{userId, topic}` whose id is the
//! composite key, so upsert and delete address the pair directly and a
//! second subscribe simply overwrites the same document.

use serde_json::json;

use crate::elastic::ElasticClient;

use super::backend::SubscriptionBackend;
use super::error::StoreError;
use super::record::Subscription;

/// Default index name for subscriptions
pub const SUBSCRIPTION_INDEX: &str = "subscriptions";

const FIELD_USER_ID: &str = "userId";
const FIELD_TOPIC: &str = "topic";

/// Subscription backend stored in an Elasticsearch index
#[derive(Debug, Clone)]
pub struct ElasticBackend {
    client: ElasticClient,
    index: String,
}

impl ElasticBackend {
    /// Create a backend over `index`
    pub fn new(client: ElasticClient, index: impl Into<String>) -> Self {
        Self {
            client,
            index: index.into(),
        }
    }

    /// Index name
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Create the index with exact-match mappings if it does not exist
    pub async fn init(&self) -> Result<(), StoreError> {
        self.client
            .ensure_index(
                &self.index,
                json!({
                    FIELD_USER_ID: { "type": "keyword" },
                    FIELD_TOPIC: { "type": "keyword" },
                }),
            )
            .await
    }
}

impl SubscriptionBackend for ElasticBackend {
    async fn upsert(&self, subscription: &Subscription) -> Result<(), StoreError> {
        self.client
            .put_document(&self.index, &subscription.document_id(), subscription)
            .await
    }

    async fn delete(&self, subscription: &Subscription) -> Result<bool, StoreError> {
        self.client
            .delete_document(&self.index, &subscription.document_id())
            .await
    }

    async fn topics_for_user(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let records: Vec<Subscription> = self
            .client
            .search_term(&self.index, FIELD_USER_ID, user_id)
            .await?;
        Ok(records.into_iter().map(|s| s.topic).collect())
    }

    async fn users_for_topic(&self, topic: &str) -> Result<Vec<String>, StoreError> {
        let records: Vec<Subscription> = self
            .client
            .search_term(&self.index, FIELD_TOPIC, topic)
            .await?;
        Ok(records.into_iter().map(|s| s.user_id).collect())
    }
}
