//! Subscriber handle types

use bytes::Bytes;
use tokio::sync::mpsc;

/// Unique id for one subscriber connection
pub type SubscriberId = u64;

/// Sending half of one subscriber connection
///
/// The registry owns the handle; the connection task owns the receiving half
/// and the socket. Sends are non-blocking, so fan-out never waits on
/// transport I/O.
#[derive(Debug)]
pub struct SubscriberHandle {
    id: SubscriberId,
    tx: mpsc::UnboundedSender<Bytes>,
}

impl SubscriberHandle {
    pub(crate) fn new(id: SubscriberId, tx: mpsc::UnboundedSender<Bytes>) -> Self {
        Self { id, tx }
    }

    /// This subscriber's id
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Queue a frame for this subscriber
    ///
    /// Returns `false` if the receiving side is gone (the connection closed).
    pub(crate) fn send(&self, frame: Bytes) -> bool {
        self.tx.send(frame).is_ok()
    }
}
