//! a1-core: Core types and configuration for the A1 Shell control panel
//!
//! This crate provides the session status model, the JSON-lines protocol
//! spoken with the local terminal service, error types and configuration
//! shared by the panel library and the CLI.

pub mod config;
pub mod error;
pub mod ipc;
pub mod status;
pub mod time;

pub use error::{ClipboardError, GatewayError, LifecycleFailure, StatusError};
pub use status::{StatusSnapshot, TerminalInfo, TerminalStatus, ACCESS_TOKEN_LEN};
