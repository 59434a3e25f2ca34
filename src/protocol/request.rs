//! Client request parsing and responses

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Body of a publish request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishBody {
    /// Display text
    pub text: String,

    /// Who sent it; defaults to empty when omitted
    #[serde(default)]
    pub sender: String,
}

/// One parsed request line
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Open a long-lived event stream
    Subscribe,
    /// Queue a message
    Publish(PublishBody),
    /// Reset the queue and all displays
    Clear,
}

impl Request {
    /// Parse a single request line
    ///
    /// Grammar: a case-insensitive command word, optionally followed by a
    /// JSON body (`PUBLISH` only).
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim_start()),
            None => (line, ""),
        };

        match command.to_ascii_uppercase().as_str() {
            "SUBSCRIBE" => Ok(Request::Subscribe),
            "CLEAR" => Ok(Request::Clear),
            "PUBLISH" => {
                let body: PublishBody = serde_json::from_str(rest)
                    .map_err(|e| ParseError::BadBody(e.to_string()))?;
                Ok(Request::Publish(body))
            }
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// One response line for a publish or clear request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request was accepted
    pub accepted: bool,

    /// Zero-based queue position (publish only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<usize>,

    /// Rejection reason (rejected requests only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Accepted publish, with the message's queue position
    pub fn published(queue_position: usize) -> Self {
        Self {
            accepted: true,
            queue_position: Some(queue_position),
            error: None,
        }
    }

    /// Accepted request with no extra payload
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            queue_position: None,
            error: None,
        }
    }

    /// Rejected request
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            accepted: false,
            queue_position: None,
            error: Some(error.into()),
        }
    }

    /// Encode as one newline-terminated JSON frame
    pub fn encode(&self) -> Bytes {
        let mut buf = serde_json::to_vec(self).unwrap_or_default();
        buf.push(b'\n');
        Bytes::from(buf)
    }
}

/// Error type for request parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank request line
    Empty,
    /// First word was not a known command
    UnknownCommand(String),
    /// Publish body was missing or malformed
    BadBody(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty request"),
            ParseError::UnknownCommand(cmd) => write!(f, "unknown command: {}", cmd),
            ParseError::BadBody(err) => write!(f, "bad publish body: {}", err),
        }
    }
}

impl std::error::Error for ParseError {}
