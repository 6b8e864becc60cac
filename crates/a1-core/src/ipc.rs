//! IPC protocol between the control panel and the terminal service
//!
//! Uses JSON-encoded messages, one per line, over TCP on localhost
//! (127.0.0.1). Requests and responses share a connection with pushed
//! events; events are tagged so a reader can tell them apart.

use serde::{Deserialize, Serialize};

use crate::status::{TerminalInfo, TerminalStatus};

/// Default IPC port of the terminal service
pub const DEFAULT_IPC_PORT: u16 = 22240;

/// Topic carrying session status pushes
pub const TERMINAL_STATUS_TOPIC: &str = "terminal-status";

/// IPC request from the panel to the terminal service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Get current session status
    GetStatus,

    /// Start a terminal session
    StartTerminal,

    /// Stop the running terminal session
    StopTerminal,

    /// Receive pushed events for a topic on this connection
    Subscribe { topic: String },

    /// Ping (for liveness checks)
    Ping,
}

/// IPC response from the terminal service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcResponse {
    /// Current session status
    Status(TerminalStatus),

    /// Session started
    Started(TerminalInfo),

    /// Generic success
    Ok,

    /// Error response
    Error { message: String },

    /// Pong response
    Pong,
}

/// Event pushed by the terminal service to subscribed connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IpcEvent {
    /// Session status changed out of band
    TerminalStatus(TerminalStatus),
}

impl IpcEvent {
    /// Topic this event is published on
    pub fn topic(&self) -> &'static str {
        match self {
            IpcEvent::TerminalStatus(_) => TERMINAL_STATUS_TOPIC,
        }
    }
}

/// Any line the terminal service writes to a connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpcMessage {
    Response(IpcResponse),
    Event(IpcEvent),
}

impl IpcMessage {
    /// Encode as a single newline-terminated JSON line
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Decode one line (surrounding whitespace ignored)
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

impl From<IpcResponse> for IpcMessage {
    fn from(resp: IpcResponse) -> Self {
        IpcMessage::Response(resp)
    }
}

impl From<IpcEvent> for IpcMessage {
    fn from(event: IpcEvent) -> Self {
        IpcMessage::Event(event)
    }
}
