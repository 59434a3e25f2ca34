//! Crate error types

use std::fmt;
use std::io;

use crate::hub::HubError;

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for server operations
#[derive(Debug)]
pub enum Error {
    /// Transport-level I/O failure
    Io(io::Error),
    /// Malformed or oversized request framing
    Protocol(String),
    /// Rejected hub operation
    Hub(HubError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Protocol(reason) => write!(f, "protocol error: {}", reason),
            Error::Hub(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Hub(e) => Some(e),
            Error::Protocol(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<HubError> for Error {
    fn from(e: HubError) -> Self {
        Error::Hub(e)
    }
}
