//! Lifecycle controller
//!
//! Two independent sources feed the panel state: settled gateway commands
//! and status pushes from the event channel. Both go through the same
//! locked [`PanelState`] update, so changes apply strictly in the order
//! they are observed and the latest write wins. The start/stop phase guard
//! keeps lifecycle commands from overlapping but never holds back a push.
//!
//! Every change is published as a [`PanelView`] on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use a1_core::config::PanelConfig;
use a1_core::time::current_time_millis;
use a1_core::{GatewayError, LifecycleFailure, StatusSnapshot};

use crate::clipboard::Clipboard;
use crate::gateway::CommandGateway;
use crate::notice::{ErrorNotice, FailureClassifier};
use crate::state::{LifecyclePhase, PanelState, PanelView};

/// Result of a user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Precondition not met; nothing was sent
    Skipped,
    /// Command completed
    Succeeded,
    /// Command failed; an error notice was raised
    Failed,
}

/// Owner of the panel state and the only writer to it
#[derive(Clone)]
pub struct LifecycleController {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn CommandGateway>,
    clipboard: Arc<dyn Clipboard>,
    classifier: FailureClassifier,
    notice_ttl: Duration,
    state: Mutex<PanelState>,
    view_tx: watch::Sender<PanelView>,
    /// Timer that clears the current notice
    expiry: Mutex<Option<JoinHandle<()>>>,
}

impl LifecycleController {
    pub fn new(
        gateway: Arc<dyn CommandGateway>,
        clipboard: Arc<dyn Clipboard>,
        config: &PanelConfig,
    ) -> Self {
        let state = PanelState::new();
        let (view_tx, _) = watch::channel(state.view());

        Self {
            inner: Arc::new(Inner {
                gateway,
                clipboard,
                classifier: FailureClassifier::from_config(config),
                notice_ttl: config.notice_ttl,
                state: Mutex::new(state),
                view_tx,
                expiry: Mutex::new(None),
            }),
        }
    }

    /// Adopt the current status and start listening for pushes.
    ///
    /// A failed status fetch leaves the empty snapshot and raises a notice.
    /// The returned task applies pushes until the channel closes.
    pub async fn initialize(&self, events: mpsc::Receiver<StatusSnapshot>) -> JoinHandle<()> {
        self.refresh().await;
        self.listen(events)
    }

    /// Replace the snapshot with the service's current status
    pub async fn refresh(&self) -> Outcome {
        match self.inner.gateway.get_status().await {
            Ok(snapshot) => {
                tracing::info!(status = %snapshot, "Current status");
                self.inner.apply(|state| {
                    state.adopt(snapshot);
                    Ok(())
                })
            }
            Err(e) => self.inner.apply(|_| Err(LifecycleFailure::StartupStatus(e))),
        }
    }

    /// Apply every push from `events` until the channel closes
    pub fn listen(&self, mut events: mpsc::Receiver<StatusSnapshot>) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            while let Some(snapshot) = events.recv().await {
                controller.on_status_push(snapshot);
            }
            tracing::info!("Status event channel closed");
        })
    }

    /// Start a session if none is running and no command is in flight.
    ///
    /// The command runs on its own task, so dropping the returned future
    /// does not abandon it: the phase still settles once the service
    /// answers.
    pub async fn request_start(&self) -> Outcome {
        if !self.inner.update(PanelState::begin_start) {
            tracing::debug!("Ignoring start request");
            return Outcome::Skipped;
        }

        tracing::info!("Starting terminal session");
        let inner = Arc::clone(&self.inner);
        let command = tokio::spawn(async move {
            let result = inner.gateway.start().await;
            let outcome = inner.apply(|state| state.finish_start(result));
            if outcome == Outcome::Succeeded {
                tracing::info!(status = %inner.state.lock().snapshot(), "Terminal session started");
            }
            outcome
        });

        match command.await {
            Ok(outcome) => outcome,
            Err(e) => self.inner.apply(|state| {
                state.finish_start(Err(GatewayError::new(format!(
                    "Start command did not complete: {}",
                    e
                ))))
            }),
        }
    }

    /// Stop the running session if no command is in flight.
    ///
    /// The displayed session is cleared even if the service reports a
    /// failure. Like [`request_start`](Self::request_start), the command
    /// settles even if the returned future is dropped.
    pub async fn request_stop(&self) -> Outcome {
        if !self.inner.update(PanelState::begin_stop) {
            tracing::debug!("Ignoring stop request");
            return Outcome::Skipped;
        }

        tracing::info!("Stopping terminal session");
        let inner = Arc::clone(&self.inner);
        let command = tokio::spawn(async move {
            let result = inner.gateway.stop().await;
            inner.apply(|state| state.finish_stop(result))
        });

        match command.await {
            Ok(outcome) => outcome,
            Err(e) => self.inner.apply(|state| {
                state.finish_stop(Err(GatewayError::new(format!(
                    "Stop command did not complete: {}",
                    e
                ))))
            }),
        }
    }

    /// Apply a status pushed by the terminal service
    pub fn on_status_push(&self, snapshot: StatusSnapshot) {
        tracing::debug!(status = %snapshot, "Status push");
        self.inner.update(|state| state.adopt(snapshot));
    }

    /// Copy text to the clipboard, raising a notice on failure
    pub async fn copy_text(&self, value: &str) -> Outcome {
        match self.inner.clipboard.copy(value).await {
            Ok(()) => Outcome::Succeeded,
            Err(e) => self.inner.apply(|_| Err(LifecycleFailure::Clipboard(e))),
        }
    }

    /// Copy the session URL, if a session is running
    pub async fn copy_url(&self) -> Outcome {
        let snapshot = self.snapshot();
        if !snapshot.is_running() {
            return Outcome::Skipped;
        }
        self.copy_text(snapshot.url()).await
    }

    /// Receive every published view
    pub fn subscribe(&self) -> watch::Receiver<PanelView> {
        self.inner.view_tx.subscribe()
    }

    pub fn view(&self) -> PanelView {
        self.inner.state.lock().view()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.state.lock().snapshot().clone()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.inner.state.lock().phase()
    }

    pub fn notice(&self) -> Option<ErrorNotice> {
        self.inner.state.lock().notice().cloned()
    }
}

impl Inner {
    /// Run one state update and publish the result
    fn update<R>(self: &Arc<Self>, f: impl FnOnce(&mut PanelState) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut *state);
        self.publish(&state);
        result
    }

    /// Run one state update; a failure raises a notice in the same update
    fn apply(
        self: &Arc<Self>,
        f: impl FnOnce(&mut PanelState) -> Result<(), LifecycleFailure>,
    ) -> Outcome {
        let mut state = self.state.lock();
        let outcome = match f(&mut *state) {
            Ok(()) => Outcome::Succeeded,
            Err(failure) => {
                tracing::warn!(kind = failure.kind(), error = %failure, "Lifecycle failure");
                let message = self.classifier.describe(&failure);
                let id = state.raise_notice(message, current_time_millis());
                self.schedule_expiry(id);
                Outcome::Failed
            }
        };
        self.publish(&state);
        outcome
    }

    fn publish(&self, state: &PanelState) {
        if state.notice().is_none() {
            if let Some(timer) = self.expiry.lock().take() {
                timer.abort();
            }
        }

        let view = state.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    /// Replace the expiry timer with one for notice `id`.
    ///
    /// Called with the state lock held so timers are replaced in the same
    /// order notices are raised.
    fn schedule_expiry(self: &Arc<Self>, id: u64) {
        let inner = Arc::downgrade(self);
        let ttl = self.notice_ttl;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = inner.upgrade() {
                inner.expire(id);
            }
        });

        if let Some(previous) = self.expiry.lock().replace(timer) {
            previous.abort();
        }
    }

    fn expire(&self, id: u64) {
        let mut state = self.state.lock();
        if state.expire_notice(id) {
            tracing::debug!(id, "Error notice expired");
            self.publish(&state);
        }
    }
}
