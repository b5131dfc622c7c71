//! Post notification fan-out

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::post::Post;
use crate::registry::{ConnectionHandle, ConnectionRegistry, NotificationEvent};
use crate::stats::{PublishReport, PublisherSnapshot, PublisherStats};
use crate::subscription::{SubscriptionBackend, SubscriptionStore};

/// Pushes new posts to every live connection of every subscriber
///
/// Holds no delivery state of its own: subscribers come from the store and
/// connections from the registry, both read at publish time.
pub struct Publisher<B> {
    store: Arc<SubscriptionStore<B>>,
    registry: Arc<ConnectionRegistry>,
    stats: PublisherStats,
}

impl<B: SubscriptionBackend> Publisher<B> {
    /// Create a publisher over a shared store and registry
    pub fn new(store: Arc<SubscriptionStore<B>>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            store,
            registry,
            stats: PublisherStats::new(),
        }
    }

    /// Subscription store this publisher reads from
    pub fn store(&self) -> &Arc<SubscriptionStore<B>> {
        &self.store
    }

    /// Connection registry this publisher writes to
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Cumulative counters
    pub fn stats(&self) -> PublisherSnapshot {
        self.stats.snapshot()
    }

    /// Notify subscribers of `post.category` about `post`
    ///
    /// Never fails: a store failure means nobody is notified, and a failed
    /// write only drops that one connection. Returns once every write has
    /// been queued or has failed; it does not wait for clients to read.
    ///
    /// The fan-out runs on its own task. Dropping the returned future only
    /// stops waiting for the report; delivery, deregistration and stats
    /// still complete.
    pub async fn publish(self: &Arc<Self>, post: &Post) -> PublishReport {
        let publisher = Arc::clone(self);
        let post = post.clone();

        match tokio::spawn(async move { publisher.fan_out(&post).await }).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Publish task failed");
                PublishReport::default()
            }
        }
    }

    async fn fan_out(&self, post: &Post) -> PublishReport {
        let users = match self.store.list_users_for_topic(&post.category).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(
                    post_id = %post.id,
                    topic = %post.category,
                    error = %e,
                    "Subscriber lookup failed, nobody notified"
                );
                self.stats.record_store_failure();
                let report = PublishReport::default();
                self.stats.record(&report);
                return report;
            }
        };

        let handles: Vec<ConnectionHandle> = users
            .iter()
            .flat_map(|user_id| self.registry.connections_for(user_id))
            .collect();

        let mut report = PublishReport {
            subscribers: users.len(),
            connections: handles.len(),
            ..Default::default()
        };

        if !handles.is_empty() {
            let event = NotificationEvent::new(&post.category, &post.title);
            self.deliver(event, handles, &mut report).await;
        }

        self.stats.record(&report);

        tracing::info!(
            post_id = %post.id,
            topic = %post.category,
            subscribers = report.subscribers,
            connections = report.connections,
            delivered = report.delivered,
            failed = report.failed,
            "Post published"
        );

        report
    }

    async fn deliver(
        &self,
        event: NotificationEvent,
        handles: Vec<ConnectionHandle>,
        report: &mut PublishReport,
    ) {
        let timeout = self.registry.config().write_timeout;
        let mut writes = JoinSet::new();

        for handle in handles {
            let event = event.clone();
            writes.spawn(async move {
                let result = handle.write(event, timeout).await;
                (handle, result)
            });
        }

        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((_, Ok(()))) => report.delivered += 1,
                Ok((handle, Err(e))) => {
                    tracing::warn!(
                        user_id = handle.user_id(),
                        connection_id = %handle.id(),
                        error = %e,
                        "Dropping connection after failed write"
                    );
                    self.registry.deregister(&handle);
                    report.failed += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Delivery task failed");
                    report.failed += 1;
                }
            }
        }
    }
}
