//! Blog post record

use serde::{Deserialize, Serialize};

use crate::registry::event::now_millis;

/// A blog post as submitted by the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post identifier; filled with the current epoch milliseconds if blank
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category, the topic subscribers follow
    pub category: String,
    #[serde(default)]
    pub author: String,
    /// ISO-8601 creation date as sent by the client
    #[serde(default)]
    pub date: String,
}

impl Post {
    /// Create a post with just the fields notifications need
    pub fn new(id: impl Into<String>, category: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: category.into(),
            author: String::new(),
            date: String::new(),
        }
    }

    /// Assign an id if the client did not send one
    pub fn ensure_id(&mut self) {
        if self.id.trim().is_empty() {
            self.id = now_millis().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_front_end_body() {
        let body = r#"{
            "id": "1712345678901",
            "title": "Big Game",
            "description": "Recap",
            "category": "Sports",
            "author": "alice",
            "comments": [],
            "date": "2024-04-05T12:00:00.000Z"
        }"#;
        let post: Post = serde_json::from_str(body).unwrap();

        assert_eq!(post.id, "1712345678901");
        assert_eq!(post.category, "Sports");
        assert_eq!(post.author, "alice");
    }

    #[test]
    fn test_ensure_id() {
        let mut post: Post = serde_json::from_str(r#"{"title":"t","category":"Health"}"#).unwrap();
        assert!(post.id.is_empty());

        post.ensure_id();
        assert!(post.id.parse::<u64>().is_ok());

        let mut post = Post::new("42", "Health", "t");
        post.ensure_id();
        assert_eq!(post.id, "42");
    }
}
