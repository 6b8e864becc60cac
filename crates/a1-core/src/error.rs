//! Core error types for A1 Shell

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single request to the terminal service.
///
/// Transport faults, undecodable replies and errors reported by the service
/// itself all collapse into this one value. Only the description is kept;
/// interpreting it is left to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayError {
    message: String,
}

impl GatewayError {
    /// Create an error from a human-readable description
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The description, exactly as reported
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Invalid message from terminal service: {}", err))
    }
}

/// Reasons a running status cannot be accepted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// URL does not parse
    #[error("Invalid session URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// URL is not an http(s) endpoint
    #[error("Unsupported scheme in session URL {0:?}")]
    UnsupportedScheme(String),

    /// URL carries no access token
    #[error("Session URL {0:?} does not carry a 32-character access token")]
    MissingToken(String),
}

/// Clipboard errors
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// No supported clipboard tool on PATH
    #[error("No clipboard tool found (tried: {0})")]
    Unavailable(String),

    /// Spawning or feeding the tool failed
    #[error("Clipboard tool {tool} failed: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Tool exited unsuccessfully
    #[error("Clipboard tool {tool} exited with {status}")]
    Failed { tool: String, status: String },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A failure the lifecycle controller turns into an error notice.
///
/// The display text is what the user sees. Service-reported failures are
/// passed through untouched.
#[derive(Error, Debug)]
pub enum LifecycleFailure {
    /// Initial status fetch failed
    #[error(transparent)]
    StartupStatus(GatewayError),

    /// Start command failed
    #[error(transparent)]
    Start(GatewayError),

    /// Start command succeeded but returned an unusable session
    #[error("Terminal service returned an unusable session: {0}")]
    MalformedStart(StatusError),

    /// Stop command failed
    #[error(transparent)]
    Stop(GatewayError),

    /// Copy to clipboard failed
    #[error("Failed to copy to clipboard")]
    Clipboard(#[source] ClipboardError),
}

impl LifecycleFailure {
    /// Short name used in log records
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleFailure::StartupStatus(_) => "startup_status",
            LifecycleFailure::Start(_) => "start",
            LifecycleFailure::MalformedStart(_) => "malformed_start",
            LifecycleFailure::Stop(_) => "stop",
            LifecycleFailure::Clipboard(_) => "clipboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_is_verbatim() {
        let err = GatewayError::new("Terminal is already running");
        assert_eq!(err.to_string(), "Terminal is already running");

        let failure = LifecycleFailure::Start(err);
        assert_eq!(failure.to_string(), "Terminal is already running");
        assert_eq!(failure.kind(), "start");
    }

    #[test]
    fn test_clipboard_failure_message() {
        let failure = LifecycleFailure::Clipboard(ClipboardError::Unavailable("pbcopy".into()));
        assert_eq!(failure.to_string(), "Failed to copy to clipboard");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: GatewayError = io.into();
        assert_eq!(err.message(), "refused");
    }
}
