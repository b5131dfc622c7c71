//! Publisher
//!
//! Invoked after a post is saved. Looks up the post category's subscribers,
//! then each subscriber's live connections, and queues one
//! [`NotificationEvent`](crate::registry::NotificationEvent) per connection.
//!
//! ```text
//!   publish(post)
//!     │
//!     ├─► SubscriptionStore::list_users_for_topic(category)   (index round-trip)
//!     │
//!     ├─► ConnectionRegistry::connections_for(user)            (per user)
//!     │
//!     └─► ConnectionHandle::write(event, write_timeout)        (per connection, concurrent)
//!            └─ failure → deregister that connection, keep going
//! ```
//!
//! The fan-out runs on a spawned task, so a caller that goes away (an HTTP
//! client disconnecting mid-request) does not cancel a publish in flight.
//!
//! The two lookups are not atomic with respect to each other. A connection
//! that closes in between shows up as a failed write.

pub mod fanout;

pub use fanout::Publisher;
