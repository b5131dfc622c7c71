//! Notification events pushed to live connections

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A "new post in a category you follow" event
///
/// Ephemeral: built once per publish, cloned per connection, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Client-local identifier (creation time in epoch milliseconds)
    pub id: u64,
    /// Post category
    pub category: String,
    /// Post title
    pub title: String,
    /// Display message
    pub message: String,
}

impl NotificationEvent {
    /// Build the event for a post in `category` titled `title`
    pub fn new(category: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_id(now_millis(), category, title)
    }

    /// Build the event with an explicit identifier
    pub fn with_id(id: u64, category: impl Into<String>, title: impl Into<String>) -> Self {
        let category = category.into();
        let title = title.into();
        let message = format!("New post in \"{}\": \"{}\"", category, title);

        Self {
            id,
            category,
            title,
            message,
        }
    }

    /// JSON body sent as the SSE `data` field
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Milliseconds since the Unix epoch (0 if the clock is before it)
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_format() {
        let event = NotificationEvent::new("Sports", "Big Game");
        assert_eq!(event.message, "New post in \"Sports\": \"Big Game\"");
        assert!(event.id > 0);
    }

    #[test]
    fn test_json_shape() {
        let event = NotificationEvent::with_id(7, "Sports", "Big Game");
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["category"], "Sports");
        assert_eq!(value["title"], "Big Game");
        assert_eq!(value["message"], "New post in \"Sports\": \"Big Game\"");
    }
}
