//! Document index client
//!
//! Minimal REST client for the Elasticsearch-compatible index that stores
//! subscriptions and posts. Only the handful of calls the backends need are
//! covered: create index, put document, delete document, term search.
//!
//! Failures map onto [`StoreError`](crate::subscription::StoreError):
//! transport errors, timeouts and 5xx answers are `Unavailable` (retryable),
//! any other non-success answer is `Backend`.

pub mod client;

pub use client::ElasticClient;
