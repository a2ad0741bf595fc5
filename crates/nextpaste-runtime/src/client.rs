//! Sync client: connects this device to a sync server or a relay room.
//!
//! The connect loop dials, sends the handshake, then services inbound
//! frames, the outbound queue and the heartbeat until the socket closes.
//! After the first successful connection a dropped socket is redialled
//! every `reconnect_interval`; a first dial that fails is final.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Sink, SinkExt, StreamExt};
use nextpaste_core::settings::{DEFAULT_HEARTBEAT_INTERVAL_SECS, DEFAULT_RECONNECT_INTERVAL_SECS};
use nextpaste_core::{ClipboardContent, ClipboardKind, LogSinkPort};
use nextpaste_protocol::{
    AssemblyOutcome, ClipboardPayload, FrameCodec, ImageAssembler, LegacyDataType, MessageType,
    ProtocolError,
};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::hub::SEND_QUEUE_CAPACITY;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Called with clipboard content received from the server.
pub type ReceiveHandler = Arc<dyn Fn(ClipboardContent) + Send + Sync>;

/// Called each time a connection (or reconnection) is established.
pub type ConnectedHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Already connected")]
    AlreadyConnected,

    #[error("Not connected")]
    NotConnected,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Send failed: {0}")]
    Send(String),
}

/// Client timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub reconnect_interval: Duration,
    pub heartbeat_interval: Duration,
    pub write_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            reconnect_interval: Duration::from_secs(DEFAULT_RECONNECT_INTERVAL_SECS),
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// State shared between the public handle and the connect loop.
#[derive(Default)]
struct Shared {
    connected: AtomicBool,
    ever_connected: AtomicBool,
    outbound: RwLock<Option<mpsc::Sender<Bytes>>>,
    on_clipboard: RwLock<Option<ReceiveHandler>>,
    on_connected: RwLock<Option<ConnectedHandler>>,
}

impl Shared {
    fn set_outbound(&self, tx: Option<mpsc::Sender<Bytes>>) {
        *self
            .outbound
            .write()
            .unwrap_or_else(PoisonError::into_inner) = tx;
    }

    fn outbound(&self) -> Option<mpsc::Sender<Bytes>> {
        self.outbound
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clipboard_handler(&self) -> Option<ReceiveHandler> {
        self.on_clipboard
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn connected_handler(&self) -> Option<ConnectedHandler> {
        self.on_connected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

struct Session {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

/// WebSocket client speaking the V1.1 binary protocol.
pub struct SyncClient {
    codec: Arc<FrameCodec>,
    log: Arc<dyn LogSinkPort>,
    options: ClientOptions,
    device_name: String,
    platform: String,
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
}

impl SyncClient {
    /// Client announcing itself as `device_name` on `platform`.
    pub fn new(
        device_name: impl Into<String>,
        platform: impl Into<String>,
        log: Arc<dyn LogSinkPort>,
        options: ClientOptions,
    ) -> Self {
        Self {
            codec: Arc::new(FrameCodec::new()),
            log,
            options,
            device_name: device_name.into(),
            platform: platform.into(),
            shared: Arc::new(Shared::default()),
            session: Mutex::new(None),
        }
    }

    /// Register the handler for content received from the server.
    pub fn on_clipboard(&self, handler: ReceiveHandler) {
        *self
            .shared
            .on_clipboard
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    /// Register the handler run after every successful (re)connection.
    pub fn on_connected(&self, handler: ConnectedHandler) {
        *self
            .shared
            .on_connected
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    /// Start connecting to `url` in the background.
    pub async fn connect(&self, url: impl Into<String>) -> Result<(), ClientError> {
        let mut guard = self.session.lock().await;
        if self.is_connected() || guard.as_ref().is_some_and(|s| !s.join.is_finished()) {
            return Err(ClientError::AlreadyConnected);
        }

        let url = url.into();
        url.as_str()
            .into_client_request()
            .map_err(|e| ClientError::Connect(format!("invalid server URL {url}: {e}")))?;

        let cancel = CancellationToken::new();
        let task = ConnectLoop {
            url,
            codec: Arc::clone(&self.codec),
            log: Arc::clone(&self.log),
            options: self.options,
            device_name: self.device_name.clone(),
            platform: self.platform.clone(),
            shared: Arc::clone(&self.shared),
            cancel: cancel.clone(),
        };
        let join = tokio::spawn(task.run());
        *guard = Some(Session { cancel, join });
        Ok(())
    }

    /// Close the connection and stop reconnecting. Does nothing if idle.
    pub async fn disconnect(&self) {
        let Some(session) = self.session.lock().await.take() else {
            return;
        };
        session.cancel.cancel();
        if let Err(e) = session.join.await {
            warn!("sync client task ended abnormally: {e}");
        }
        self.shared.connected.store(false, Ordering::SeqCst);
        self.shared.ever_connected.store(false, Ordering::SeqCst);
        self.shared.set_outbound(None);
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Whether the connect loop is still running (connected or retrying).
    ///
    /// Turns false after `disconnect` or once the first dial fails.
    pub async fn is_active(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| !s.join.is_finished())
    }

    /// Send clipboard content. Images go out as a single frame.
    pub async fn send_clipboard(&self, content: &ClipboardContent) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        let frame = self.codec.content_frame(content)?;
        let tx = self.shared.outbound().ok_or(ClientError::NotConnected)?;
        tx.send(frame)
            .await
            .map_err(|_| ClientError::Send("connection closed".into()))
    }

    /// Send text, or a base64-encoded image, as clipboard content.
    pub async fn send_clipboard_base64(
        &self,
        kind: ClipboardKind,
        content: &str,
    ) -> Result<(), ClientError> {
        let payload = ClipboardPayload {
            data_type: match kind {
                ClipboardKind::Text => LegacyDataType::Text,
                ClipboardKind::Image => LegacyDataType::Image,
            },
            mime_type: kind.default_mime().to_string(),
            content: content.to_string(),
            preview: None,
        };
        let content = payload.into_content()?;
        self.send_clipboard(&content).await
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("device_name", &self.device_name)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

/// Why a session ended.
enum SessionEnd {
    Cancelled,
    Closed,
}

struct ConnectLoop {
    url: String,
    codec: Arc<FrameCodec>,
    log: Arc<dyn LogSinkPort>,
    options: ClientOptions,
    device_name: String,
    platform: String,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl ConnectLoop {
    async fn run(self) {
        loop {
            let dial = tokio::select! {
                () = self.cancel.cancelled() => break,
                result = connect_async(self.url.as_str()) => result,
            };

            match dial {
                Ok((socket, _)) => {
                    self.shared.connected.store(true, Ordering::SeqCst);
                    self.shared.ever_connected.store(true, Ordering::SeqCst);
                    self.log.success(format!("connected to server: {}", self.url));

                    let end = self.session(socket).await;

                    self.shared.connected.store(false, Ordering::SeqCst);
                    self.shared.set_outbound(None);
                    if matches!(end, SessionEnd::Cancelled) {
                        self.log.info("disconnected from server".to_string());
                        break;
                    }
                    self.log.warning("connection to server lost".to_string());
                }
                Err(e) => {
                    if !self.shared.ever_connected.load(Ordering::SeqCst) {
                        self.log.error(format!("initial connection failed: {e}"));
                        break;
                    }
                    self.log.warning(format!("reconnect failed: {e}"));
                }
            }

            self.log.info(format!(
                "reconnecting in {}s",
                self.options.reconnect_interval.as_secs()
            ));
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.options.reconnect_interval) => {}
            }
        }
    }

    async fn session(&self, socket: Socket) -> SessionEnd {
        let (mut sink, mut stream) = socket.split();
        let write_timeout = self.options.write_timeout;

        match self.codec.handshake(&self.device_name, &self.platform) {
            Ok(frame) => {
                if let Err(e) = send(&mut sink, Message::Binary(frame), write_timeout).await {
                    self.log.error(format!("failed to send handshake: {e}"));
                    return SessionEnd::Closed;
                }
            }
            Err(e) => self.log.error(format!("failed to encode handshake: {e}")),
        }

        let (tx, mut outbound) = mpsc::channel(SEND_QUEUE_CAPACITY);
        self.shared.set_outbound(Some(tx));
        if let Some(handler) = self.shared.connected_handler() {
            handler();
        }

        let heartbeat = self.options.heartbeat_interval;
        let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
        let mut assembler = ImageAssembler::new();

        loop {
            let message = tokio::select! {
                () = self.cancel.cancelled() => {
                    let _ = send(&mut sink, Message::Close(None), write_timeout).await;
                    return SessionEnd::Cancelled;
                }
                inbound = stream.next() => match inbound {
                    Some(Ok(Message::Binary(data))) => {
                        self.handle_binary(&mut assembler, data);
                        continue;
                    }
                    Some(Ok(Message::Text(_))) => {
                        self.log.warning(
                            "received non-binary message; server may be running an old protocol version"
                                .to_string(),
                        );
                        continue;
                    }
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Closed,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!(error = %e, "websocket read failed");
                        return SessionEnd::Closed;
                    }
                },
                frame = outbound.recv() => match frame {
                    Some(frame) => Message::Binary(frame),
                    None => return SessionEnd::Closed,
                },
                _ = ticker.tick() => match self.codec.heartbeat() {
                    Ok(frame) => Message::Binary(frame),
                    Err(e) => {
                        debug!(error = %e, "failed to encode heartbeat");
                        continue;
                    }
                },
            };

            if let Err(e) = send(&mut sink, message, write_timeout).await {
                self.log.error(format!("failed to send message: {e}"));
                return SessionEnd::Closed;
            }
        }
    }

    fn handle_binary(&self, assembler: &mut ImageAssembler, data: Bytes) {
        let frame = match self.codec.parse(data) {
            Ok(frame) => frame,
            Err(ProtocolError::Loopback) => return,
            Err(e) => {
                self.log.error(format!("failed to parse binary message: {e}"));
                return;
            }
        };

        match frame.kind {
            MessageType::Text => {
                let text = frame.text_content().unwrap_or_default();
                self.deliver(ClipboardContent::text(text));
            }
            MessageType::Image => match assembler.push(&frame) {
                AssemblyOutcome::Complete { image, .. } => self.deliver(image.into_content()),
                AssemblyOutcome::Dropped { pending, received } => {
                    debug!(pending, received, "fragment for another message, transfer dropped");
                }
                AssemblyOutcome::Pending { .. } | AssemblyOutcome::Ignored => {}
            },
            MessageType::Handshake => match frame.handshake_meta() {
                Ok(meta) => self.log.info(format!(
                    "server handshake: {} ({}) [protocol V1.{}]",
                    meta.name,
                    meta.os,
                    meta.minor_version()
                )),
                Err(e) => self.log.error(format!("failed to parse handshake: {e}")),
            },
            MessageType::Heartbeat => {}
            MessageType::File | MessageType::Unknown(_) => {
                self.log.warning(format!("unsupported message type: {}", frame.kind));
            }
        }
    }

    fn deliver(&self, content: ClipboardContent) {
        if let Some(handler) = self.shared.clipboard_handler() {
            handler(content);
        }
    }
}

async fn send<S>(sink: &mut S, message: Message, write_timeout: Duration) -> Result<(), String>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    match timeout(write_timeout, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("write timed out".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextpaste_core::NoopLogSink;

    fn client() -> SyncClient {
        SyncClient::new(
            "test-device",
            "linux",
            Arc::new(NoopLogSink),
            ClientOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let client = client();
        assert!(!client.is_connected());
        let err = client
            .send_clipboard(&ClipboardContent::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
    }

    #[tokio::test]
    async fn test_invalid_base64_is_rejected_before_sending() {
        let client = client();
        let err = client
            .send_clipboard_base64(ClipboardKind::Image, "not base64!")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Protocol(ProtocolError::Base64(_))
        ));
    }

    #[tokio::test]
    async fn test_initial_connection_failure_stops_the_loop() {
        // Bind and drop a listener to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = client();
        client
            .connect(format!("ws://127.0.0.1:{port}/ws"))
            .await
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while client.is_active().await {
            assert!(Instant::now() < deadline, "connect loop did not stop");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!client.is_connected());

        // A finished loop does not block a new attempt.
        client
            .connect(format!("ws://127.0.0.1:{port}/ws"))
            .await
            .unwrap();
        client.disconnect().await;
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let client = client();
        let err = client.connect("not a url").await.unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)));
    }

    #[tokio::test]
    async fn test_disconnect_when_idle_is_a_no_op() {
        let client = client();
        client.disconnect().await;
        client.disconnect().await;
        assert!(!client.is_connected());
    }
}
