//! Command gateway to the terminal service
//!
//! Each lifecycle operation is a single request/response exchange. Nothing
//! here retries or serializes calls; keeping start/stop from overlapping is
//! the controller's job.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use a1_core::config::PanelConfig;
use a1_core::ipc::{IpcEvent, IpcRequest, IpcResponse};
use a1_core::{GatewayError, StatusSnapshot, TerminalInfo};

/// Request/response boundary to the terminal service's lifecycle operations
#[async_trait]
pub trait CommandGateway: Send + Sync {
    /// Current session status
    async fn get_status(&self) -> Result<StatusSnapshot, GatewayError>;

    /// Start a session and return its connection details
    async fn start(&self) -> Result<TerminalInfo, GatewayError>;

    /// Stop the running session
    async fn stop(&self) -> Result<(), GatewayError>;
}

/// Gateway speaking the JSON-lines IPC protocol over localhost TCP
///
/// Opens a new connection for each request, so there is no connection
/// state to manage or recover.
#[derive(Debug, Clone)]
pub struct IpcGateway {
    address: String,
    timeout: Option<Duration>,
}

impl IpcGateway {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(config.ipc_address()).with_timeout(config.request_timeout)
    }

    /// Bound every request by `timeout` (`None` waits indefinitely)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send a single request and get its response
    pub async fn request(&self, request: IpcRequest) -> Result<IpcResponse, GatewayError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(request))
                .await
                .map_err(|_| {
                    GatewayError::new(format!(
                        "Terminal service at {} did not answer within {:?}",
                        self.address, limit
                    ))
                })?,
            None => self.exchange(request).await,
        }
    }

    async fn exchange(&self, request: IpcRequest) -> Result<IpcResponse, GatewayError> {
        tracing::debug!(address = %self.address, ?request, "Sending request");

        let stream = TcpStream::connect(&self.address).await.map_err(|e| {
            GatewayError::new(format!(
                "Failed to connect to terminal service at {}: {}",
                self.address, e
            ))
        })?;

        let (reader, mut writer) = stream.into_split();

        let mut request_json = serde_json::to_string(&request)?;
        request_json.push('\n');
        writer.write_all(request_json.as_bytes()).await?;

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Err(GatewayError::new(
                    "Terminal service closed the connection without answering",
                ));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Pushed events are not answers; the event channel owns those
            if serde_json::from_str::<IpcEvent>(trimmed).is_ok() {
                tracing::trace!("Skipping event on request connection: {}", trimmed);
                continue;
            }

            return Ok(serde_json::from_str(trimmed)?);
        }
    }

    /// Check if the terminal service answers a ping
    pub async fn ping(&self) -> bool {
        matches!(self.request(IpcRequest::Ping).await, Ok(IpcResponse::Pong))
    }
}

fn unexpected(response: IpcResponse) -> GatewayError {
    GatewayError::new(format!(
        "Unexpected response from terminal service: {:?}",
        response
    ))
}

#[async_trait]
impl CommandGateway for IpcGateway {
    async fn get_status(&self) -> Result<StatusSnapshot, GatewayError> {
        match self.request(IpcRequest::GetStatus).await? {
            IpcResponse::Status(status) => Ok(status.into()),
            IpcResponse::Error { message } => Err(GatewayError::new(message)),
            other => Err(unexpected(other)),
        }
    }

    async fn start(&self) -> Result<TerminalInfo, GatewayError> {
        match self.request(IpcRequest::StartTerminal).await? {
            IpcResponse::Started(info) => Ok(info),
            IpcResponse::Error { message } => Err(GatewayError::new(message)),
            other => Err(unexpected(other)),
        }
    }

    async fn stop(&self) -> Result<(), GatewayError> {
        match self.request(IpcRequest::StopTerminal).await? {
            IpcResponse::Ok => Ok(()),
            IpcResponse::Error { message } => Err(GatewayError::new(message)),
            other => Err(unexpected(other)),
        }
    }
}
