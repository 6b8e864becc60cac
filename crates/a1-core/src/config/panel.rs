//! Control panel configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::{duration_secs, option_duration_secs};
use crate::ipc::DEFAULT_IPC_PORT;

/// How long an error notice stays visible
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(8);

/// Advice appended to failures caused by missing service binaries
pub const DEFAULT_REMEDIATION_HINT: &str = "Please run: ./scripts/download-binaries.sh";

/// Configuration for the control panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// IPC port of the terminal service (localhost only)
    pub ipc_port: u16,

    /// Lifetime of an error notice
    #[serde(with = "duration_secs")]
    pub notice_ttl: Duration,

    /// Upper bound on a single service request (none = wait indefinitely)
    #[serde(
        with = "option_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout: Option<Duration>,

    /// Hint appended to missing-binary failures
    pub remediation_hint: String,

    /// Capacity of the status push queue
    pub event_buffer: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            ipc_port: DEFAULT_IPC_PORT,
            notice_ttl: DEFAULT_NOTICE_TTL,
            request_timeout: None,
            remediation_hint: DEFAULT_REMEDIATION_HINT.to_string(),
            event_buffer: 256,
        }
    }
}

impl PanelConfig {
    /// Get the IPC address (localhost:port)
    pub fn ipc_address(&self) -> String {
        format!("127.0.0.1:{}", self.ipc_port)
    }
}
