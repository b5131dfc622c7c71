//! Subscription record
//!
//! One user's interest in one topic. The (user, topic) pair is the identity:
//! there is never more than one record per pair.

use serde::{Deserialize, Serialize};

/// Interest of one user in one post category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Opaque user identifier
    pub user_id: String,
    /// Category name
    pub topic: String,
}

impl Subscription {
    /// Create a new subscription record
    pub fn new(user_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            topic: topic.into(),
        }
    }

    /// Composite key used as the document id in the backing index
    ///
    /// `user:topic`, with `%` and `:` escaped inside each part so that no two
    /// pairs share an id.
    pub fn document_id(&self) -> String {
        format!("{}:{}", escape_key_part(&self.user_id), escape_key_part(&self.topic))
    }
}

fn escape_key_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.user_id, self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id() {
        let sub = Subscription::new("alice", "Sports");
        assert_eq!(sub.document_id(), "alice:Sports");
    }

    #[test]
    fn test_document_id_separator_in_parts() {
        let first = Subscription::new("a", "b:c");
        let second = Subscription::new("a:b", "c");

        assert_ne!(first.document_id(), second.document_id());
        assert_eq!(first.document_id(), "a:b%3Ac");
        assert_eq!(second.document_id(), "a%3Ab:c");
    }

    #[test]
    fn test_document_id_escapes_percent() {
        let literal = Subscription::new("a%3Ab", "c");
        let separator = Subscription::new("a:b", "c");

        assert_ne!(literal.document_id(), separator.document_id());
        assert_eq!(literal.document_id(), "a%253Ab:c");
    }

    #[test]
    fn test_serializes_camel_case() {
        let sub = Subscription::new("alice", "Sports");
        let json = serde_json::to_string(&sub).unwrap();
        assert_eq!(json, r#"{"userId":"alice","topic":"Sports"}"#);
    }
}
