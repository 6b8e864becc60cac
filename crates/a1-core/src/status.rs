//! Session status model
//!
//! [`StatusSnapshot`] is the single description of the terminal session the
//! panel displays. A snapshot that claims to be running always carries an
//! endpoint URL with an embedded access token; a stopped snapshot carries
//! nothing at all. Values that would break this are normalized to stopped.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::StatusError;

/// Length of the access token embedded in every session URL
pub const ACCESS_TOKEN_LEN: usize = 32;

/// Connection details returned by a successful start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalInfo {
    /// Public endpoint of the session
    pub url: String,
    /// Login user name
    pub username: String,
    /// Login password
    pub password: String,
    /// Local port the terminal listens on
    pub port: u16,
}

/// Session status as it travels over the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalStatus {
    pub running: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

impl TerminalStatus {
    /// Status of a service with no session
    pub fn stopped() -> Self {
        Self::default()
    }
}

impl From<TerminalInfo> for TerminalStatus {
    fn from(info: TerminalInfo) -> Self {
        Self {
            running: true,
            url: Some(info.url),
            username: Some(info.username),
            password: Some(info.password),
            port: Some(info.port),
        }
    }
}

/// Immutable description of the session at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TerminalStatus")]
pub struct StatusSnapshot {
    running: bool,
    url: String,
    username: String,
    password: String,
    port: Option<u16>,
}

impl StatusSnapshot {
    /// The empty, not-running snapshot
    pub fn stopped() -> Self {
        Self::default()
    }

    /// Build a running snapshot from start results, validating the endpoint
    pub fn running(info: TerminalInfo) -> Result<Self, StatusError> {
        Self::checked(info.url, info.username, info.password, Some(info.port))
    }

    fn checked(
        url: String,
        username: String,
        password: String,
        port: Option<u16>,
    ) -> Result<Self, StatusError> {
        validate_endpoint(&url)?;
        Ok(Self {
            running: true,
            url,
            username,
            password,
            port,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// User-facing status label
    pub fn label(&self) -> &'static str {
        if self.running {
            "Running"
        } else {
            "Not Running"
        }
    }
}

impl From<TerminalStatus> for StatusSnapshot {
    fn from(status: TerminalStatus) -> Self {
        if !status.running {
            return Self::stopped();
        }

        let url = status.url.unwrap_or_default();
        match Self::checked(
            url,
            status.username.unwrap_or_default(),
            status.password.unwrap_or_default(),
            status.port,
        ) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Treating invalid running status as not running");
                Self::stopped()
            }
        }
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.running {
            write!(f, "{} at {}", self.label(), self.url)
        } else {
            write!(f, "{}", self.label())
        }
    }
}

/// Check that `raw` is an http(s) endpoint carrying an access token.
///
/// The token may be any path segment or query value made of exactly
/// [`ACCESS_TOKEN_LEN`] ASCII alphanumerics.
pub fn validate_endpoint(raw: &str) -> Result<(), StatusError> {
    let parsed = Url::parse(raw).map_err(|e| StatusError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(StatusError::UnsupportedScheme(raw.to_string()));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(StatusError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    let in_path = parsed
        .path_segments()
        .map(|mut segments| segments.any(is_access_token))
        .unwrap_or(false);
    let in_query = parsed.query_pairs().any(|(_, value)| is_access_token(&value));

    if in_path || in_query {
        Ok(())
    } else {
        Err(StatusError::MissingToken(raw.to_string()))
    }
}

fn is_access_token(candidate: &str) -> bool {
    candidate.len() == ACCESS_TOKEN_LEN && candidate.chars().all(|c| c.is_ascii_alphanumeric())
}
