//! Message queue store
//!
//! Holds the ordered list of submitted messages and the cursor marking how
//! many of them have been released to subscribers. This is the sole
//! authoritative "current position" state; the hub serializes all access.

pub mod message;
pub mod store;

pub use message::Message;
pub use store::MessageQueue;
