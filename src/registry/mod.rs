//! Subscriber registry and fan-out
//!
//! Tracks the set of currently open subscriber connections and fans events
//! out to all of them. Frames are pre-encoded `bytes::Bytes`, so one
//! allocation is reference-counted across every subscriber rather than
//! copied per connection.
//!
//! Delivery is best effort: a send failure on one subscriber prunes that
//! subscriber and never interrupts delivery to the rest. There is no retry
//! and no acknowledgment.

pub mod store;
pub mod subscriber;

pub use store::SubscriberRegistry;
pub use subscriber::{SubscriberHandle, SubscriberId};
