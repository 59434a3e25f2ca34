//! Queued message type

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A single published message
///
/// Immutable once created. Identity is the `id` string, derived from the
/// wall clock plus a process-local counter; messages are only ever streamed
/// in queue order, never looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque message id
    pub id: String,

    /// Display text
    pub text: String,

    /// Who sent it (may be empty)
    #[serde(default)]
    pub sender: String,

    /// Creation time, unix milliseconds
    pub created_at: u64,
}

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

impl Message {
    /// Create a new message with a fresh id and the current timestamp
    pub fn new(text: impl Into<String>, sender: impl Into<String>) -> Self {
        let created_at = unix_millis();
        let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);

        Self {
            id: format!("{}-{}", created_at, seq),
            text: text.into(),
            sender: sender.into(),
            created_at,
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_fields() {
        let msg = Message::new("HELLO", "A");

        assert_eq!(msg.text, "HELLO");
        assert_eq!(msg.sender, "A");
        assert!(msg.created_at > 0);
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn test_ids_distinct() {
        let a = Message::new("one", "");
        let b = Message::new("two", "");

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_sender_defaults_empty_on_deserialize() {
        let msg: Message =
            serde_json::from_str(r#"{"id":"1","text":"hi","created_at":5}"#).unwrap();

        assert_eq!(msg.sender, "");
    }
}
