//! Message hub: queue, registry and delivery scheduling
//!
//! The hub is the owning component for all shared mutable state: the message
//! queue, the subscriber registry, and the delivery-cycle bookkeeping live
//! behind a single lock, constructed once at process start and exposed only
//! through `publish`, `clear` and `subscribe`.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<MessageHub>
//!                 ┌──────────────────────────┐
//!                 │ Mutex<HubState> {        │
//!                 │   queue: MessageQueue,   │
//!                 │   subscribers: Registry, │
//!                 │   cycle_active, epoch,   │
//!                 │ }                        │
//!                 └────────────┬─────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          │                   │                   │
//!          ▼                   ▼                   ▼
//!     [Producer]        [delivery cycle]     [Subscriber]
//!     publish()         one release per      stream.recv()
//!          │            interval                   │
//!          └──► queue ──► registry.broadcast() ──► TCP
//! ```
//!
//! Critical sections never cross an await and fan-out sends are
//! non-blocking, so the lock is held only for queue/registry bookkeeping.
//! Broadcasting inside the critical section is what makes the ordering
//! guarantees hold: a late joiner's history replay can never interleave
//! with a release step, and no stale pre-clear message can be released
//! after the clear sentinel.

mod scheduler;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::protocol::Event;
use crate::queue::{Message, MessageQueue};
use crate::registry::{SubscriberHandle, SubscriberId, SubscriberRegistry};

/// Default pause between releases, matching the "one message at a time,
/// paced for legibility" display cadence.
pub const DEFAULT_RELEASE_INTERVAL: Duration = Duration::from_millis(1500);

/// Error type for hub operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// Publish payload was rejected before touching the queue
    InvalidInput(String),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::InvalidInput(reason) => write!(f, "invalid input: {}", reason),
        }
    }
}

impl std::error::Error for HubError {}

/// Acknowledgment returned to a producer on publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Zero-based position the message was appended at
    pub queue_position: usize,
}

pub(crate) struct HubState {
    pub(crate) queue: MessageQueue,
    pub(crate) subscribers: SubscriberRegistry,

    /// At most one delivery cycle runs at a time
    pub(crate) cycle_active: bool,

    /// Bumped on clear; an in-flight cycle that observes a mismatch exits
    /// without delivering
    pub(crate) epoch: u64,
}

/// Central hub for publishing, clearing and subscribing
pub struct MessageHub {
    state: Mutex<HubState>,
    release_interval: Duration,
    next_subscriber_id: AtomicU64,
}

impl MessageHub {
    /// Create a hub with the default release interval
    pub fn new() -> Arc<Self> {
        Self::with_interval(DEFAULT_RELEASE_INTERVAL)
    }

    /// Create a hub with a custom release interval
    pub fn with_interval(release_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(HubState {
                queue: MessageQueue::new(),
                subscribers: SubscriberRegistry::new(),
                cycle_active: false,
                epoch: 0,
            }),
            release_interval,
            next_subscriber_id: AtomicU64::new(1),
        })
    }

    /// Pause between releases
    pub fn release_interval(&self) -> Duration {
        self.release_interval
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a message for paced delivery to all subscribers
    ///
    /// Rejects empty or whitespace-only text without touching the queue.
    /// Starts a delivery cycle if none is running; a cycle that is already
    /// running simply picks the message up in a later step.
    pub fn publish(self: &Arc<Self>, text: &str, sender: &str) -> Result<Receipt, HubError> {
        if text.trim().is_empty() {
            return Err(HubError::InvalidInput("message text is empty".into()));
        }

        let message = Message::new(text, sender);
        let message_id = message.id.clone();

        let mut state = self.state();
        let queue_position = state.queue.append(message);

        tracing::debug!(
            message_id = %message_id,
            queue_position,
            queue_len = state.queue.len(),
            "Message queued"
        );

        if !state.cycle_active {
            state.cycle_active = true;
            let epoch = state.epoch;
            drop(state);
            scheduler::spawn_cycle(Arc::clone(self), epoch);
        }

        Ok(Receipt { queue_position })
    }

    /// Reset the queue and push the clear sentinel to every subscriber
    ///
    /// The sentinel is broadcast immediately, outside the timed release
    /// cadence. Any in-flight delivery cycle is invalidated in the same
    /// critical section, so nothing queued before the clear can be released
    /// after it.
    pub fn clear(&self) {
        let mut state = self.state();
        let dropped = state.queue.len() - state.queue.released_count();
        state.queue.clear();
        state.epoch = state.epoch.wrapping_add(1);
        state.cycle_active = false;
        let subscribers = state.subscribers.broadcast(Event::Clear.encode());
        drop(state);

        tracing::info!(dropped_messages = dropped, subscribers, "Queue cleared");
    }

    /// Register a new subscriber
    ///
    /// Already-released messages are replayed to the new subscriber only, in
    /// order, before it sees any future event. Unreleased messages are never
    /// replayed early. Dropping the returned stream deregisters it.
    pub fn subscribe(self: &Arc<Self>) -> SubscriberStream {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut state = self.state();
        let history: Vec<Bytes> = state
            .queue
            .released()
            .iter()
            .map(|m| Event::Message(m.clone()).encode())
            .collect();
        let replayed = history.len();

        state.subscribers.add(SubscriberHandle::new(id, tx));
        for frame in history {
            if !state.subscribers.send_to(id, frame) {
                break;
            }
        }
        let subscribers = state.subscribers.len();
        drop(state);

        tracing::info!(subscriber_id = id, replayed, subscribers, "Subscriber added");

        SubscriberStream {
            id,
            rx,
            hub: Arc::clone(self),
        }
    }

    fn remove_subscriber(&self, id: SubscriberId) {
        let mut state = self.state();
        if state.subscribers.remove(id) {
            let subscribers = state.subscribers.len();
            drop(state);
            tracing::info!(subscriber_id = id, subscribers, "Subscriber removed");
        }
    }

    /// Total number of queued messages
    pub fn queue_len(&self) -> usize {
        self.state().queue.len()
    }

    /// Number of released messages
    pub fn released_count(&self) -> usize {
        self.state().queue.released_count()
    }

    /// Whether every queued message has been released
    pub fn is_drained(&self) -> bool {
        self.state().queue.is_drained()
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.state().subscribers.len()
    }
}

/// Receiving end of one subscription
///
/// Yields pre-encoded event frames in delivery order. Dropping the stream
/// deregisters the subscriber, so disconnection always cleans up even on
/// abnormal transport termination.
pub struct SubscriberStream {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<Bytes>,
    hub: Arc<MessageHub>,
}

impl SubscriberStream {
    /// This subscriber's id
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event frame
    ///
    /// Returns `None` once the subscriber has been pruned and all pending
    /// frames were drained.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Take the next event frame if one is already pending
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.rx.try_recv().ok()
    }
}

impl Drop for SubscriberStream {
    fn drop(&mut self) {
        self.hub.remove_subscriber(self.id);
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{advance, sleep, Duration, Instant};
    use tokio_test::assert_ok;

    use super::*;

    async fn next_event(stream: &mut SubscriberStream) -> Event {
        let frame = stream.recv().await.expect("stream closed");
        Event::decode(std::str::from_utf8(&frame).unwrap()).unwrap()
    }

    fn text_of(event: &Event) -> &str {
        match event {
            Event::Message(m) => &m.text,
            Event::Clear => panic!("expected message, got clear"),
        }
    }

    #[tokio::test]
    async fn test_publish_rejects_empty_text() {
        let hub = MessageHub::new();

        assert!(matches!(
            hub.publish("", "A"),
            Err(HubError::InvalidInput(_))
        ));
        assert!(matches!(
            hub.publish("  \t ", "A"),
            Err(HubError::InvalidInput(_))
        ));
        assert_eq!(hub.queue_len(), 0);
    }

    #[tokio::test]
    async fn test_publish_positions() {
        let hub = MessageHub::new();

        assert_eq!(assert_ok!(hub.publish("a", "")).queue_position, 0);
        assert_eq!(assert_ok!(hub.publish("b", "")).queue_position, 1);
        assert_eq!(assert_ok!(hub.publish("c", "")).queue_position, 2);

        hub.clear();
        assert_eq!(assert_ok!(hub.publish("d", "")).queue_position, 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_message() {
        let hub = MessageHub::with_interval(Duration::from_millis(10));
        let mut stream = hub.subscribe();

        hub.publish("HELLO", "A").unwrap();

        match next_event(&mut stream).await {
            Event::Message(m) => {
                assert_eq!(m.text, "HELLO");
                assert_eq!(m.sender, "A");
            }
            Event::Clear => panic!("unexpected clear"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifo_order_and_pacing() {
        let hub = MessageHub::new();
        let mut stream = hub.subscribe();

        hub.publish("HELLO", "A").unwrap();
        hub.publish("WORLD", "B").unwrap();

        let first = next_event(&mut stream).await;
        let first_at = Instant::now();
        let second = next_event(&mut stream).await;
        let second_at = Instant::now();

        assert_eq!(text_of(&first), "HELLO");
        assert_eq!(text_of(&second), "WORLD");
        assert!(second_at - first_at >= DEFAULT_RELEASE_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eventual_drain() {
        let hub = MessageHub::new();

        hub.publish("a", "").unwrap();
        hub.publish("b", "").unwrap();
        hub.publish("c", "").unwrap();

        // Auto-advance steps through each release timer in turn
        sleep(Duration::from_secs(10)).await;

        assert_eq!(hub.released_count(), 3);
        assert!(hub.is_drained());
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_while_running_extends_cycle() {
        let hub = MessageHub::new();
        let mut stream = hub.subscribe();

        hub.publish("one", "").unwrap();
        assert_eq!(text_of(&next_event(&mut stream).await), "one");
        let first_at = Instant::now();

        // Lands mid-interval; must be picked up by the running cycle, paced
        hub.publish("two", "").unwrap();
        assert_eq!(text_of(&next_event(&mut stream).await), "two");
        assert!(Instant::now() - first_at >= DEFAULT_RELEASE_INTERVAL);
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_joiner_replays_released_history() {
        let hub = MessageHub::new();

        hub.publish("a", "").unwrap();
        hub.publish("b", "").unwrap();
        sleep(Duration::from_secs(10)).await;
        assert!(hub.is_drained());

        let mut stream = hub.subscribe();
        assert_eq!(text_of(&next_event(&mut stream).await), "a");
        assert_eq!(text_of(&next_event(&mut stream).await), "b");

        hub.publish("c", "").unwrap();
        assert_eq!(text_of(&next_event(&mut stream).await), "c");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_joiner_does_not_see_unreleased() {
        let hub = MessageHub::new();

        hub.publish("first", "").unwrap();
        hub.publish("second", "").unwrap();

        // Let the cycle release "first" but not "second"
        advance(Duration::from_millis(100)).await;
        assert_eq!(hub.released_count(), 1);

        let mut stream = hub.subscribe();
        let replay = stream.try_recv().expect("released history expected");
        let event = Event::decode(std::str::from_utf8(&replay).unwrap()).unwrap();
        assert_eq!(text_of(&event), "first");
        assert!(stream.try_recv().is_none());

        // "second" arrives only when the cycle releases it
        assert_eq!(text_of(&next_event(&mut stream).await), "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_sentinel_and_cancelled_cycle() {
        let hub = MessageHub::new();
        let mut stream = hub.subscribe();

        hub.publish("kept", "").unwrap();
        assert_eq!(text_of(&next_event(&mut stream).await), "kept");

        // Queued but not yet released when the clear lands
        hub.publish("stale", "").unwrap();
        hub.clear();

        assert_eq!(next_event(&mut stream).await, Event::Clear);

        // The invalidated cycle must never deliver the stale message
        advance(Duration::from_secs(10)).await;
        assert!(stream.try_recv().is_none());
        assert_eq!(hub.queue_len(), 0);

        // A fresh joiner sees empty history
        let mut late = hub.subscribe();
        assert!(late.try_recv().is_none());

        // And publishing still works after the clear
        hub.publish("fresh", "").unwrap();
        assert_eq!(text_of(&next_event(&mut stream).await), "fresh");
        assert_eq!(text_of(&next_event(&mut late).await), "fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_subscriber_pruned() {
        let hub = MessageHub::new();
        let mut kept = hub.subscribe();
        let dropped = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        drop(dropped);
        assert_eq!(hub.subscriber_count(), 1);

        hub.publish("still here", "").unwrap();
        assert_eq!(text_of(&next_event(&mut kept).await), "still here");
        assert_eq!(hub.subscriber_count(), 1);
    }
}
