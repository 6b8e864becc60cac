//! User-facing error notices

use a1_core::config::{PanelConfig, DEFAULT_REMEDIATION_HINT};
use a1_core::LifecycleFailure;

/// A transient failure message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    /// Monotonic identity; a newer notice always has a larger id
    pub id: u64,
    /// Text to display
    pub message: String,
    /// Unix milliseconds at which the notice was raised
    pub raised_at: u64,
}

/// Shapes lifecycle failures into notice text.
///
/// Failures caused by a missing service binary get a remediation hint
/// appended; everything else is shown as reported.
#[derive(Debug, Clone)]
pub struct FailureClassifier {
    remediation_hint: String,
}

impl FailureClassifier {
    pub fn new(remediation_hint: impl Into<String>) -> Self {
        Self {
            remediation_hint: remediation_hint.into(),
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(config.remediation_hint.clone())
    }

    /// Notice text for a failure
    pub fn describe(&self, failure: &LifecycleFailure) -> String {
        let message = failure.to_string();
        if is_missing_binary(&message) && !self.remediation_hint.is_empty() {
            format!("{}\n\n{}", message, self.remediation_hint)
        } else {
            message
        }
    }
}

impl Default for FailureClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_REMEDIATION_HINT)
    }
}

/// Whether a failure description reports a missing executable
pub fn is_missing_binary(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("binary") && lower.contains("not found")
}
