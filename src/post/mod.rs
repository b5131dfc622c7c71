//! Blog posts as seen by the notification core
//!
//! Creating a post persists it and then hands it to the
//! [`Publisher`](crate::publisher::Publisher).

pub mod record;
pub mod repository;

pub use record::Post;
pub use repository::{ElasticPostRepository, MemoryPostRepository, PostRepository, POST_INDEX};
