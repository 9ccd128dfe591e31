//! Session stream framing and connection types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generation number of one controller binding.
///
/// Every asynchronous result that belongs to a binding carries its id, so a
/// result produced for a binding that has since been torn down can be told
/// apart from one for the current binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Frames received from the remote session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    /// Raw text (possibly containing ANSI sequences) to render
    Output { content: String },
    /// Out-of-band diagnostic text from the backend
    Error { content: String },
}

/// Frames sent to the remote session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundFrame {
    Input { content: String },
}

/// Events a transport reports back to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Frame(InboundFrame),
    /// The far side closed the stream (or it failed). Emitted once; nothing follows it.
    Closed { reason: Option<String> },
}

/// Connection status for one session stream
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Closed,
    Error(String),
}

/// Error types for session stream operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport is not open")]
    NotOpen,
    #[error("failed to connect: {0}")]
    Connect(String),
    #[error("failed to decode frame: {0}")]
    Decode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one inbound text frame
pub fn decode_frame(text: &str) -> Result<InboundFrame, TransportError> {
    serde_json::from_str(text).map_err(|e| TransportError::Decode(format!("{}: {}", e, text)))
}

/// Encode user input as an outbound frame
pub fn encode_input(content: &str) -> Result<String, TransportError> {
    let frame = OutboundFrame::Input {
        content: content.to_string(),
    };
    Ok(serde_json::to_string(&frame)?)
}
