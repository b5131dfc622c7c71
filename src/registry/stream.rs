//! Receiving side of a live push connection

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::Stream;

use super::entry::ConnectionId;
use super::event::NotificationEvent;
use super::store::ConnectionRegistry;

/// Events queued for one connection, in write order
///
/// Returned by [`ConnectionRegistry::register`]. Dropping the stream (the
/// client went away) deregisters the connection. The stream ends once the
/// registry lets go of the connection, e.g. on [`ConnectionRegistry::close_all`].
pub struct EventStream {
    id: ConnectionId,
    user_id: Arc<str>,
    rx: mpsc::Receiver<NotificationEvent>,
    registry: Arc<ConnectionRegistry>,
    closed: bool,
}

impl EventStream {
    pub(super) fn new(
        id: ConnectionId,
        user_id: Arc<str>,
        rx: mpsc::Receiver<NotificationEvent>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            id,
            user_id,
            rx,
            registry,
            closed: false,
        }
    }

    /// Connection identifier
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    /// Owning user
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Next event, or `None` once the connection is closed and drained
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        self.rx.recv().await
    }

    /// Next event if one is queued
    pub fn try_recv(&mut self) -> Option<NotificationEvent> {
        self.rx.try_recv().ok()
    }

    /// Close the connection and deregister it
    ///
    /// Already-queued events can still be received. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.rx.close();
        self.registry.remove(&self.user_id, self.id);
    }
}

impl Stream for EventStream {
    type Item = NotificationEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("closed", &self.closed)
            .finish()
    }
}
