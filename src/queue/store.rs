//! Queue store implementation
//!
//! Append-only message list plus a released-count cursor. The cursor only
//! grows, except on `clear`, which resets both fields together. The store
//! itself never rejects input; validation happens before messages reach it.

use super::message::Message;

/// Ordered queue of messages with a release cursor
///
/// Invariant: `released <= messages.len()`. Not internally synchronized;
/// the hub guards it with a single lock.
#[derive(Debug, Default)]
pub struct MessageQueue {
    messages: Vec<Message>,
    released: usize,
}

impl MessageQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning its zero-based queue position
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Reset to empty, dropping all messages and the cursor together
    pub fn clear(&mut self) {
        self.messages.clear();
        self.released = 0;
    }

    /// The next message eligible for release, if any
    pub fn next_unreleased(&self) -> Option<&Message> {
        self.messages.get(self.released)
    }

    /// Advance the cursor past the message just broadcast
    ///
    /// Caller must have just fanned out `next_unreleased()`'s result; the
    /// two calls form one release step under the hub lock.
    pub fn mark_released(&mut self) {
        debug_assert!(self.released < self.messages.len());
        self.released = (self.released + 1).min(self.messages.len());
    }

    /// Already-released prefix, in original order
    pub fn released(&self) -> &[Message] {
        &self.messages[..self.released]
    }

    /// Number of released messages
    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Total number of queued messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the queue holds no messages at all
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether every queued message has been released
    pub fn is_drained(&self) -> bool {
        self.released == self.messages.len()
    }
}
