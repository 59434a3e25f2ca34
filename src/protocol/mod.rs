//! Wire protocol
//!
//! Line-delimited frames over a persistent socket. A client sends exactly one
//! request line; `SUBSCRIBE` turns the connection into a server-initiated
//! push stream of [`Event`] frames, while `PUBLISH` and `CLEAR` get a single
//! [`Response`] line and the connection closes.
//!
//! ```text
//! SUBSCRIBE
//! ← {"type":"message","id":"...","text":"HELLO","sender":"A","created_at":1700000000000}
//! ← {"type":"clear"}
//!
//! PUBLISH {"text":"HELLO","sender":"A"}
//! ← {"accepted":true,"queue_position":0}
//!
//! CLEAR
//! ← {"accepted":true}
//! ```

pub mod event;
pub mod request;

pub use event::Event;
pub use request::{ParseError, PublishBody, Request, Response};
