//! Post persistence
//!
//! Posts live in the same document index as subscriptions. The fan-out only
//! needs "save succeeded"; everything else about posts is handled elsewhere.

use std::collections::HashMap;
use std::future::Future;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::elastic::ElasticClient;
use crate::subscription::StoreError;

use super::record::Post;

/// Default index name for posts
pub const POST_INDEX: &str = "blog-posts";

/// Persistence for newly created posts
pub trait PostRepository: Send + Sync + 'static {
    /// Store `post` under its id, replacing any previous version
    fn save(&self, post: &Post) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Index document layout: the post without its id, plus engagement fields
#[derive(Serialize)]
struct PostDocument<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    author: &'a str,
    date: &'a str,
    likes: u64,
    comments: &'a [serde_json::Value],
}

impl<'a> From<&'a Post> for PostDocument<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            title: &post.title,
            description: &post.description,
            category: &post.category,
            author: &post.author,
            date: &post.date,
            likes: 0,
            comments: &[],
        }
    }
}

/// Posts stored in an Elasticsearch index
#[derive(Debug, Clone)]
pub struct ElasticPostRepository {
    client: ElasticClient,
    index: String,
}

impl ElasticPostRepository {
    pub fn new(client: ElasticClient, index: impl Into<String>) -> Self {
        Self {
            client,
            index: index.into(),
        }
    }
}

impl PostRepository for ElasticPostRepository {
    async fn save(&self, post: &Post) -> Result<(), StoreError> {
        self.client
            .put_document(&self.index, &post.id, &PostDocument::from(post))
            .await
    }
}

/// Posts held in process memory
#[derive(Debug, Default)]
pub struct MemoryPostRepository {
    posts: RwLock<HashMap<String, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a saved post
    pub async fn get(&self, id: &str) -> Option<Post> {
        self.posts.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

impl PostRepository for MemoryPostRepository {
    async fn save(&self, post: &Post) -> Result<(), StoreError> {
        self.posts
            .write()
            .await
            .insert(post.id.clone(), post.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        let mut post = Post::new("1", "Sports", "Big Game");
        post.author = "alice".into();

        let value = serde_json::to_value(PostDocument::from(&post)).unwrap();
        assert_eq!(value["title"], "Big Game");
        assert_eq!(value["likes"], 0);
        assert_eq!(value["comments"], serde_json::json!([]));
        assert!(value.get("id").is_none());
    }

    #[tokio::test]
    async fn test_memory_save_replaces() {
        let repo = MemoryPostRepository::new();

        repo.save(&Post::new("1", "Sports", "first")).await.unwrap();
        repo.save(&Post::new("1", "Sports", "second")).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(repo.get("1").await.unwrap().title, "second");
    }
}
