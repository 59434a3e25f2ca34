//! Paced message queue and fan-out for live text displays
//!
//! One or more producers publish short text messages; any number of
//! passively connected displays subscribe to a long-lived push stream and
//! show the messages one at a time. Queued messages are released at a fixed
//! interval (1.5 s by default) instead of dumping a backlog all at once, and
//! a broadcast clear signal resets every display simultaneously.
//!
//! The crate splits into:
//!
//! - [`queue`] — ordered message list plus the released-count cursor
//! - [`registry`] — the set of open subscriber connections and the
//!   best-effort fan-out primitive
//! - [`hub`] — the owning component tying queue, registry and the timed
//!   delivery cycle together behind one lock
//! - [`protocol`] — line-delimited JSON wire types
//! - [`server`] — TCP ingress translating requests into hub calls
//!
//! # Example
//!
//! ```no_run
//! use marquee_rs::{MarqueeServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> marquee_rs::Result<()> {
//!     let server = MarqueeServer::new(ServerConfig::default());
//!     server.run().await
//! }
//! ```
//!
//! State lives in-process only: nothing survives a restart, and running
//! multiple instances gives each its own independent queue.

pub mod error;
pub mod hub;
pub mod protocol;
pub mod queue;
pub mod registry;
pub mod server;

pub use error::{Error, Result};
pub use hub::{HubError, MessageHub, Receipt, SubscriberStream, DEFAULT_RELEASE_INTERVAL};
pub use protocol::{Event, PublishBody, Request, Response};
pub use queue::Message;
pub use server::{MarqueeServer, ServerConfig};
