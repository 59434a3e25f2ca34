//! Events pushed to subscribers

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::queue::Message;

/// One event on a subscriber stream
///
/// Either an ordinary message or the out-of-band clear sentinel. Tagged at
/// the protocol level so displays can tell them apart without guessing at
/// payload shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// A released message
    Message(Message),
    /// Reset signal; carries no payload
    Clear,
}

impl Event {
    /// Encode as one newline-terminated JSON frame
    ///
    /// Encoded once per broadcast; the `Bytes` frame is reference-counted
    /// across all subscribers.
    pub fn encode(&self) -> Bytes {
        let mut buf = serde_json::to_vec(self).unwrap_or_default();
        buf.push(b'\n');
        Bytes::from(buf)
    }

    /// Decode a single frame line
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_frame_shape() {
        let msg = Message {
            id: "17-0".into(),
            text: "HELLO".into(),
            sender: "A".into(),
            created_at: 17,
        };
        let frame = Event::Message(msg).encode();

        assert!(frame.ends_with(b"\n"));
        let value: serde_json::Value = serde_json::from_slice(&frame).unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["text"], "HELLO");
        assert_eq!(value["sender"], "A");
        assert_eq!(value["created_at"], 17);
    }

    #[test]
    fn test_clear_frame_shape() {
        let frame = Event::Clear.encode();

        assert_eq!(&frame[..], b"{\"type\":\"clear\"}\n");
    }

    #[test]
    fn test_decode_roundtrip() {
        let msg = Message::new("WORLD", "B");
        let event = Event::Message(msg);
        let frame = event.encode();
        let line = std::str::from_utf8(&frame).unwrap();

        assert_eq!(Event::decode(line).unwrap(), event);
        assert_eq!(Event::decode("{\"type\":\"clear\"}\n").unwrap(), Event::Clear);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Event::decode("not json").is_err());
        assert!(Event::decode(r#"{"type":"nope"}"#).is_err());
    }
}
