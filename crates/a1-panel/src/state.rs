//! Panel state container
//!
//! [`PanelState`] holds the snapshot/phase/notice triple and every rule for
//! changing it. It is synchronous and owns no tasks; the controller wraps it
//! in a lock and calls these methods as command results and pushes arrive,
//! so each call is one serialized state update.

use a1_core::{GatewayError, LifecycleFailure, StatusSnapshot, TerminalInfo};

use crate::notice::ErrorNotice;

/// Whether a lifecycle command is in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// No command in flight
    #[default]
    Idle,
    /// Start command issued, not yet settled
    Starting,
    /// Stop command issued, not yet settled
    Stopping,
}

impl LifecyclePhase {
    pub fn is_busy(self) -> bool {
        self != LifecyclePhase::Idle
    }

    /// Progress line shown while busy
    pub fn progress_message(self) -> Option<&'static str> {
        match self {
            LifecyclePhase::Idle => None,
            LifecyclePhase::Starting => Some("Starting terminal..."),
            LifecyclePhase::Stopping => Some("Stopping terminal..."),
        }
    }
}

/// Read-only projection handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelView {
    pub snapshot: StatusSnapshot,
    pub busy: bool,
    pub progress: Option<&'static str>,
    pub notice: Option<ErrorNotice>,
}

impl PanelView {
    /// Start is offered only when stopped and idle
    pub fn can_start(&self) -> bool {
        !self.snapshot.is_running() && !self.busy
    }

    /// Stop is offered only when running and idle
    pub fn can_stop(&self) -> bool {
        self.snapshot.is_running() && !self.busy
    }
}

/// Mutable state of the panel
#[derive(Debug, Default)]
pub struct PanelState {
    snapshot: StatusSnapshot,
    phase: LifecyclePhase,
    notice: Option<ErrorNotice>,
    last_notice_id: u64,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn notice(&self) -> Option<&ErrorNotice> {
        self.notice.as_ref()
    }

    pub fn view(&self) -> PanelView {
        PanelView {
            snapshot: self.snapshot.clone(),
            busy: self.phase.is_busy(),
            progress: self.phase.progress_message(),
            notice: self.notice.clone(),
        }
    }

    /// Replace the snapshot with a fetched or pushed one.
    ///
    /// Applies whatever the phase; an in-flight command that settles later
    /// overwrites it in turn.
    pub fn adopt(&mut self, snapshot: StatusSnapshot) {
        self.snapshot = snapshot;
    }

    /// Enter `Starting` if stopped and idle. Returns false when the request
    /// must be ignored.
    pub fn begin_start(&mut self) -> bool {
        if self.snapshot.is_running() || self.phase.is_busy() {
            return false;
        }
        self.phase = LifecyclePhase::Starting;
        self.notice = None;
        true
    }

    /// Settle a start command and return to `Idle`.
    ///
    /// Any failure, including a result that is not a valid running session,
    /// leaves the panel not running.
    pub fn finish_start(
        &mut self,
        result: Result<TerminalInfo, GatewayError>,
    ) -> Result<(), LifecycleFailure> {
        debug_assert_eq!(self.phase, LifecyclePhase::Starting);
        self.phase = LifecyclePhase::Idle;

        let started = result
            .map_err(LifecycleFailure::Start)
            .and_then(|info| StatusSnapshot::running(info).map_err(LifecycleFailure::MalformedStart));

        match started {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                Ok(())
            }
            Err(failure) => {
                self.snapshot = StatusSnapshot::stopped();
                Err(failure)
            }
        }
    }

    /// Enter `Stopping` if running and idle. Returns false when the request
    /// must be ignored.
    pub fn begin_stop(&mut self) -> bool {
        if !self.snapshot.is_running() || self.phase.is_busy() {
            return false;
        }
        self.phase = LifecyclePhase::Stopping;
        true
    }

    /// Settle a stop command and return to `Idle`. The session is cleared
    /// even when the command failed.
    pub fn finish_stop(&mut self, result: Result<(), GatewayError>) -> Result<(), LifecycleFailure> {
        debug_assert_eq!(self.phase, LifecyclePhase::Stopping);
        self.phase = LifecyclePhase::Idle;
        self.snapshot = StatusSnapshot::stopped();
        result.map_err(LifecycleFailure::Stop)
    }

    /// Show a new notice, replacing the current one. Returns its id.
    pub fn raise_notice(&mut self, message: String, raised_at: u64) -> u64 {
        self.last_notice_id += 1;
        self.notice = Some(ErrorNotice {
            id: self.last_notice_id,
            message,
            raised_at,
        });
        self.last_notice_id
    }

    /// Clear the notice if it is still the one with `id`
    pub fn expire_notice(&mut self, id: u64) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.id == id) {
            self.notice = None;
            true
        } else {
            false
        }
    }
}
