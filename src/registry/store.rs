//! Subscriber registry implementation

use std::collections::HashMap;

use bytes::Bytes;

use super::subscriber::{SubscriberHandle, SubscriberId};

/// Set of currently registered subscriber connections
///
/// Not internally synchronized; the hub guards it with a single lock.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: HashMap<SubscriberId, SubscriberHandle>,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber
    pub fn add(&mut self, handle: SubscriberHandle) {
        self.subscribers.insert(handle.id(), handle);
    }

    /// Deregister a subscriber
    ///
    /// Idempotent: removing an unknown or already-removed id is a no-op.
    /// Returns whether the subscriber was present.
    pub fn remove(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Push a frame to every registered subscriber
    ///
    /// A failed send marks that subscriber dead; dead subscribers are pruned
    /// before returning and do not interrupt delivery to the rest. Returns
    /// the number of subscribers that accepted the frame.
    pub fn broadcast(&mut self, frame: Bytes) -> usize {
        let mut dead: Vec<SubscriberId> = Vec::new();

        for (id, handle) in &self.subscribers {
            if !handle.send(frame.clone()) {
                dead.push(*id);
            }
        }

        for id in dead {
            self.subscribers.remove(&id);
            tracing::debug!(subscriber_id = id, "Subscriber pruned on failed send");
        }

        self.subscribers.len()
    }

    /// Push a frame to one subscriber only
    ///
    /// Used for history replay to a late joiner. Prunes the subscriber on
    /// failure. Returns whether the frame was accepted.
    pub fn send_to(&mut self, id: SubscriberId, frame: Bytes) -> bool {
        match self.subscribers.get(&id) {
            Some(handle) if handle.send(frame) => true,
            Some(_) => {
                self.subscribers.remove(&id);
                tracing::debug!(subscriber_id = id, "Subscriber pruned on failed send");
                false
            }
            None => false,
        }
    }

    /// Number of registered subscribers
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no subscribers are registered
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
