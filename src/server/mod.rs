//! TCP ingress
//!
//! Accept loop and per-connection request handling. This is the thin
//! translation layer between the wire protocol and the hub: one request line
//! in, either a single response line out or a long-lived subscriber push
//! stream.

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use listener::MarqueeServer;
