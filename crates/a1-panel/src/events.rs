//! Event channel for unsolicited status pushes
//!
//! One long-lived connection subscribes to the `terminal-status` topic and
//! forwards every pushed status, in arrival order, into an mpsc channel.
//! A dropped connection is not re-established: the receiver simply closes.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use a1_core::config::PanelConfig;
use a1_core::ipc::{IpcEvent, IpcMessage, IpcRequest, TERMINAL_STATUS_TOPIC};
use a1_core::StatusSnapshot;

/// Subscriber delivering status pushes from the terminal service
pub struct EventSubscriber {
    address: String,
    buffer: usize,
    cancel: CancellationToken,
}

impl EventSubscriber {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            buffer: 256,
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(config.ipc_address()).with_buffer(config.event_buffer)
    }

    /// Capacity of the delivery queue
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    /// Start the subscription, returning a receiver for status pushes
    ///
    /// This spawns a background task that connects, subscribes and forwards
    /// pushes until the service disconnects or [`stop`](Self::stop) is called.
    pub fn start(&self) -> mpsc::Receiver<StatusSnapshot> {
        let (event_tx, event_rx) = mpsc::channel(self.buffer);

        let address = self.address.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            event_loop(address, event_tx, cancel).await;
        });

        event_rx
    }

    /// Stop the subscription
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

async fn event_loop(
    address: String,
    event_tx: mpsc::Sender<StatusSnapshot>,
    cancel: CancellationToken,
) {
    let stream = tokio::select! {
        result = TcpStream::connect(&address) => result,
        _ = cancel.cancelled() => return,
    };
    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to connect to terminal service for events: {}", e);
            return;
        }
    };

    // The write half stays bound so the service never sees a half-close
    let (reader, mut writer) = stream.into_split();
    if let Err(e) = subscribe(&mut writer).await {
        tracing::warn!("Failed to subscribe to {}: {}", TERMINAL_STATUS_TOPIC, e);
        return;
    }
    tracing::info!("Subscribed to {} on {}", TERMINAL_STATUS_TOPIC, address);

    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Event subscriber cancelled");
                return;
            }

            result = reader.read_line(&mut line) => {
                match result {
                    Ok(0) => {
                        tracing::info!("Terminal service closed the event channel");
                        return;
                    }
                    Ok(_) => {
                        if let Some(snapshot) = parse_push(&line) {
                            if event_tx.send(snapshot).await.is_err() {
                                tracing::debug!("Status receiver dropped");
                                return;
                            }
                        }
                        line.clear();
                    }
                    Err(e) => {
                        tracing::warn!("Event channel read error: {}", e);
                        return;
                    }
                }
            }
        }
    }
}

async fn subscribe(writer: &mut tokio::net::tcp::OwnedWriteHalf) -> std::io::Result<()> {
    let request = IpcRequest::Subscribe {
        topic: TERMINAL_STATUS_TOPIC.to_string(),
    };
    let mut json = serde_json::to_string(&request)?;
    json.push('\n');
    writer.write_all(json.as_bytes()).await
}

/// Extract a status push from one line, skipping anything else
fn parse_push(line: &str) -> Option<StatusSnapshot> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match IpcMessage::from_line(trimmed) {
        Ok(IpcMessage::Event(IpcEvent::TerminalStatus(status))) => Some(status.into()),
        Ok(IpcMessage::Response(response)) => {
            tracing::trace!("Ignoring response on event channel: {:?}", response);
            None
        }
        _ => {
            tracing::warn!("Unknown message on event channel: {}", trimmed);
            None
        }
    }
}
