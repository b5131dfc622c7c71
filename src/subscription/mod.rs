//! Subscription store
//!
//! Durable mapping from (user, topic) to a subscription record, kept in the
//! document index and queried on every call.
//!
//! ```text
//!   subscribe / unsubscribe          list_users_for_topic
//!   (HTTP handlers)                  (Publisher)
//!          │                                │
//!          ▼                                ▼
//!   ┌────────────────────────────────────────────┐
//!   │ SubscriptionStore<B>                       │
//!   │   validation, de-duplication, logging      │
//!   └──────────────────────┬─────────────────────┘
//!                          ▼
//!          B: SubscriptionBackend
//!          ├── ElasticBackend  (index "subscriptions")
//!          └── MemoryBackend   (tests, local dev)
//! ```

pub mod backend;
pub mod elastic;
pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use backend::SubscriptionBackend;
pub use elastic::{ElasticBackend, SUBSCRIPTION_INDEX};
pub use error::StoreError;
pub use memory::MemoryBackend;
pub use record::Subscription;
pub use store::SubscriptionStore;
