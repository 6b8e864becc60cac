//! IPC integration tests
//!
//! Runs the gateway and event subscriber against a scripted terminal
//! service listening on localhost.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use a1_core::config::PanelConfig;
use a1_core::ipc::{IpcEvent, IpcMessage, IpcRequest, IpcResponse, TERMINAL_STATUS_TOPIC};
use a1_core::{StatusSnapshot, TerminalInfo, TerminalStatus};
use a1_panel::{
    CommandGateway, EventSubscriber, IpcGateway, LifecycleController, Outcome, SystemClipboard,
};

const URL: &str = "https://calm-fox.trycloudflare.com/?token=0123456789ABCDEFGHIJKLMNOPQRSTUV";

static PORT_COUNTER: AtomicU16 = AtomicU16::new(0);

/// Get a unique port for this test
fn get_test_port() -> u16 {
    let offset = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    39400 + offset
}

fn terminal_info() -> TerminalInfo {
    TerminalInfo {
        url: URL.to_string(),
        username: "calmfox42".to_string(),
        password: "482913".to_string(),
        port: 7681,
    }
}

fn running_status() -> TerminalStatus {
    terminal_info().into()
}

/// What the scripted service does after a request
enum Reply {
    /// Write these lines and wait for the next request
    Lines(Vec<String>),
    /// Write these lines and close the connection
    LinesThenClose(Vec<String>),
    /// Write these lines and keep the connection open without reading
    LinesThenHold(Vec<String>),
}

fn line(message: impl Into<IpcMessage>) -> String {
    message.into().to_line().expect("Failed to encode message")
}

fn answer(response: IpcResponse) -> Reply {
    Reply::Lines(vec![line(response)])
}

type Handler = Arc<dyn Fn(IpcRequest) -> Reply + Send + Sync>;

/// Start a scripted service, returning its address and accept task
async fn spawn_service(
    handler: impl Fn(IpcRequest) -> Reply + Send + Sync + 'static,
) -> (String, JoinHandle<()>) {
    let address = format!("127.0.0.1:{}", get_test_port());
    let listener = TcpListener::bind(&address)
        .await
        .expect("Failed to bind test service");
    let handler: Handler = Arc::new(handler);

    let task = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_connection(stream, Arc::clone(&handler)));
        }
    });

    (address, task)
}

async fn serve_connection(stream: TcpStream, handler: Handler) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = String::new();

    loop {
        buf.clear();
        match reader.read_line(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let request: IpcRequest = match serde_json::from_str(buf.trim()) {
            Ok(r) => r,
            Err(_) => return,
        };

        let (lines, then) = match handler(request) {
            Reply::Lines(lines) => (lines, None),
            Reply::LinesThenClose(lines) => (lines, Some(false)),
            Reply::LinesThenHold(lines) => (lines, Some(true)),
        };
        for l in lines {
            if writer.write_all(l.as_bytes()).await.is_err() {
                return;
            }
        }
        match then {
            None => continue,
            Some(false) => return,
            Some(true) => {
                let _keep_open = (reader, writer);
                std::future::pending::<()>().await;
                return;
            }
        }
    }
}

fn status_push(status: TerminalStatus) -> String {
    line(IpcEvent::TerminalStatus(status))
}

#[tokio::test]
async fn test_get_status_running() {
    let (address, server) = spawn_service(|request| match request {
        IpcRequest::GetStatus => answer(IpcResponse::Status(running_status())),
        _ => answer(IpcResponse::Error {
            message: "unexpected".to_string(),
        }),
    })
    .await;

    let gateway = IpcGateway::new(&address);
    let snapshot = gateway.get_status().await.unwrap();
    assert!(snapshot.is_running());
    assert_eq!(snapshot.url(), URL);
    assert_eq!(snapshot.username(), "calmfox42");
    assert_eq!(snapshot.port(), Some(7681));

    server.abort();
}

#[tokio::test]
async fn test_get_status_without_token_is_not_running() {
    let (address, server) = spawn_service(|_| {
        answer(IpcResponse::Status(TerminalStatus {
            running: true,
            url: Some("https://calm-fox.trycloudflare.com".to_string()),
            ..TerminalStatus::stopped()
        }))
    })
    .await;

    let snapshot = IpcGateway::new(&address).get_status().await.unwrap();
    assert_eq!(snapshot, StatusSnapshot::stopped());

    server.abort();
}

#[tokio::test]
async fn test_start_and_stop() {
    let (address, server) = spawn_service(|request| match request {
        IpcRequest::StartTerminal => answer(IpcResponse::Started(terminal_info())),
        IpcRequest::StopTerminal => answer(IpcResponse::Ok),
        _ => answer(IpcResponse::Pong),
    })
    .await;

    let gateway = IpcGateway::new(&address);
    assert_eq!(gateway.start().await.unwrap(), terminal_info());
    gateway.stop().await.unwrap();
    assert!(gateway.ping().await);

    server.abort();
}

#[tokio::test]
async fn test_error_message_is_verbatim() {
    let message = "Binary cloudflared not found at \"/opt/a1/resources/cloudflared\".";
    let (address, server) = spawn_service(move |_| {
        answer(IpcResponse::Error {
            message: message.to_string(),
        })
    })
    .await;

    let err = IpcGateway::new(&address).start().await.unwrap_err();
    assert_eq!(err.message(), message);

    server.abort();
}

#[tokio::test]
async fn test_unexpected_response() {
    let (address, server) = spawn_service(|_| answer(IpcResponse::Pong)).await;

    let err = IpcGateway::new(&address).stop().await.unwrap_err();
    assert!(err.message().contains("Unexpected response"));

    server.abort();
}

#[tokio::test]
async fn test_events_on_request_connection_are_skipped() {
    let (address, server) = spawn_service(|_| {
        Reply::Lines(vec![
            status_push(TerminalStatus::stopped()),
            "\n".to_string(),
            line(IpcResponse::Status(running_status())),
        ])
    })
    .await;

    let snapshot = IpcGateway::new(&address).get_status().await.unwrap();
    assert!(snapshot.is_running());

    server.abort();
}

#[tokio::test]
async fn test_connection_closed_without_answer() {
    let (address, server) = spawn_service(|_| Reply::LinesThenClose(Vec::new())).await;

    let err = IpcGateway::new(&address).get_status().await.unwrap_err();
    assert!(err.message().contains("closed the connection"));

    server.abort();
}

#[tokio::test]
async fn test_request_timeout() {
    let (address, server) = spawn_service(|_| Reply::LinesThenHold(Vec::new())).await;

    let gateway = IpcGateway::new(&address).with_timeout(Some(Duration::from_millis(100)));
    let err = timeout(Duration::from_secs(5), gateway.start())
        .await
        .expect("gateway ignored its timeout")
        .unwrap_err();
    assert!(err.message().contains("did not answer"));

    server.abort();
}

#[tokio::test]
async fn test_subscriber_delivers_pushes_in_order() {
    let (address, server) = spawn_service(|request| match request {
        IpcRequest::Subscribe { topic } if topic == TERMINAL_STATUS_TOPIC => {
            Reply::LinesThenClose(vec![
                status_push(running_status()),
                line(IpcResponse::Ok),
                status_push(TerminalStatus::stopped()),
                "not json\n".to_string(),
                status_push(running_status()),
            ])
        }
        _ => Reply::LinesThenClose(Vec::new()),
    })
    .await;

    let subscriber = EventSubscriber::new(&address);
    let mut rx = subscriber.start();

    let mut received = Vec::new();
    while let Some(snapshot) = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Timeout waiting for push")
    {
        received.push(snapshot.is_running());
    }

    // the channel closes once the service disconnects
    assert_eq!(received, vec![true, false, true]);

    server.abort();
}

#[tokio::test]
async fn test_subscriber_stop_closes_receiver() {
    let (address, server) = spawn_service(|_| {
        Reply::LinesThenHold(vec![status_push(TerminalStatus::stopped())])
    })
    .await;

    let subscriber = EventSubscriber::new(&address);
    let mut rx = subscriber.start();

    let first = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(first, Some(StatusSnapshot::stopped()));

    subscriber.stop();
    let next = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(next, None);

    server.abort();
}

#[tokio::test]
async fn test_subscriber_without_service_closes() {
    let subscriber = EventSubscriber::new(format!("127.0.0.1:{}", get_test_port()));
    let mut rx = subscriber.start();

    let next = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
    assert_eq!(next, None);
}

#[tokio::test]
async fn test_controller_over_ipc() {
    let (address, server) = spawn_service(|request| match request {
        IpcRequest::GetStatus => answer(IpcResponse::Status(TerminalStatus::stopped())),
        IpcRequest::StartTerminal => answer(IpcResponse::Started(terminal_info())),
        IpcRequest::StopTerminal => answer(IpcResponse::Ok),
        IpcRequest::Subscribe { .. } => Reply::LinesThenHold(Vec::new()),
        IpcRequest::Ping => answer(IpcResponse::Pong),
    })
    .await;

    let config = PanelConfig {
        ipc_port: address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .expect("test address has a port"),
        ..PanelConfig::default()
    };
    let controller = LifecycleController::new(
        Arc::new(IpcGateway::from_config(&config)),
        Arc::new(SystemClipboard::new()),
        &config,
    );
    let subscriber = EventSubscriber::from_config(&config);
    controller.initialize(subscriber.start()).await;

    assert!(!controller.snapshot().is_running());
    assert_eq!(controller.request_start().await, Outcome::Succeeded);
    assert_eq!(controller.snapshot().url(), URL);
    assert_eq!(controller.request_stop().await, Outcome::Succeeded);
    assert_eq!(controller.snapshot(), StatusSnapshot::stopped());
    assert!(controller.notice().is_none());

    subscriber.stop();
    server.abort();
}
