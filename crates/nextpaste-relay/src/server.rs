//! Axum server for the relay.
//!
//! Routes:
//! - `GET /ws/{roomId}`: join a room (WebSocket upgrade)
//! - `GET /`: info page
//! - `GET /health`, `GET /stats`: JSON status

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::page;
use crate::rooms::{RelayStats, RoomRegistry, short_id};

const EMPTY_ROOM: &str = "Room ID cannot be empty";
const INVALID_PATH: &str = "Invalid path format. Use: /ws/{roomID}";

/// Keep-alive and write deadlines for relay connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayTiming {
    /// A connection with no inbound traffic (pongs included) for this long
    /// is closed.
    pub read_timeout: Duration,
    pub ping_interval: Duration,
    pub write_timeout: Duration,
}

impl Default for RelayTiming {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(30),
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// Shared relay state.
#[derive(Debug, Clone, Default)]
pub struct RelayServer {
    rooms: Arc<RoomRegistry>,
    timing: RelayTiming,
    cancel: CancellationToken,
}

impl RelayServer {
    pub fn new(timing: RelayTiming) -> Self {
        Self {
            timing,
            ..Self::default()
        }
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn stats(&self) -> RelayStats {
        self.rooms.stats()
    }

    /// Close every connection and forget all rooms.
    pub fn shutdown(&self) {
        info!("closing all relay connections");
        self.rooms.shutdown();
        self.cancel.cancel();
    }

    /// Router for the relay endpoints.
    ///
    /// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(root))
            .route("/health", get(health))
            .route("/stats", get(stats))
            .route("/ws", get(invalid_path))
            .route("/ws/", get(empty_room))
            .route("/ws/{room}", get(join_room))
            .route("/ws/{room}/{*rest}", get(invalid_path))
            .with_state(self.clone())
    }
}

/// Serve the relay on `listener` until `cancel` fires, then shut it down.
pub async fn serve(
    listener: TcpListener,
    relay: RelayServer,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Relay server listening on {addr}");
    info!("Clients connect to ws://{addr}/ws/<roomID>");

    let app = relay.router();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(cancel.cancelled_owned())
    .await?;

    relay.shutdown();
    info!("Relay server shut down");
    Ok(())
}

async fn root(headers: HeaderMap) -> Html<String> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    Html(page::render(host))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "nextpaste-relay",
    }))
}

async fn stats(State(relay): State<RelayServer>) -> Json<RelayStats> {
    Json(relay.stats())
}

async fn empty_room() -> Response {
    (StatusCode::BAD_REQUEST, EMPTY_ROOM).into_response()
}

async fn invalid_path() -> Response {
    (StatusCode::BAD_REQUEST, INVALID_PATH).into_response()
}

async fn join_room(
    Path(room): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(relay): State<RelayServer>,
    ws: WebSocketUpgrade,
) -> Response {
    if room.is_empty() {
        return empty_room().await;
    }
    ws.on_upgrade(move |socket| run(socket, room, addr, relay))
}

async fn run(socket: WebSocket, room: String, addr: SocketAddr, relay: RelayServer) {
    let id = Uuid::new_v4().to_string();
    let queue = relay.rooms.join(&room, &id);
    info!(room = %room, client = %short_id(&id), from = %addr, "client connected");

    let (sink, stream) = socket.split();
    let mut writer = tokio::spawn(write_loop(
        sink,
        queue,
        relay.timing,
        relay.cancel.clone(),
    ));
    let mut reader = tokio::spawn(read_loop(
        stream,
        room.clone(),
        id.clone(),
        Arc::clone(&relay.rooms),
        relay.timing.read_timeout,
    ));

    tokio::select! {
        _ = &mut reader => writer.abort(),
        _ = &mut writer => reader.abort(),
    }

    relay.rooms.leave(&room, &id);
    info!(room = %room, client = %short_id(&id), "client disconnected");
}

async fn read_loop(
    mut stream: SplitStream<WebSocket>,
    room: String,
    id: String,
    rooms: Arc<RoomRegistry>,
    read_timeout: Duration,
) {
    loop {
        let Ok(next) = timeout(read_timeout, stream.next()).await else {
            warn!(room = %room, client = %short_id(&id), "read timed out");
            break;
        };

        match next {
            Some(Ok(message @ (Message::Binary(_) | Message::Text(_)))) => {
                let size = match &message {
                    Message::Binary(data) => data.len(),
                    Message::Text(text) => text.len(),
                    _ => 0,
                };
                debug!(room = %room, client = %short_id(&id), size, "forwarding message");
                rooms.broadcast(&room, &message, &id);
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Err(e)) => {
                warn!(room = %room, client = %short_id(&id), error = %e, "client disconnected abnormally");
                break;
            }
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut queue: mpsc::Receiver<Message>,
    timing: RelayTiming,
    cancel: CancellationToken,
) {
    let mut ping = interval_at(Instant::now() + timing.ping_interval, timing.ping_interval);
    loop {
        let message = tokio::select! {
            () = cancel.cancelled() => None,
            message = queue.recv() => message,
            _ = ping.tick() => Some(Message::Ping(Bytes::new())),
        };

        let Some(message) = message else {
            let _ = timeout(timing.write_timeout, sink.send(Message::Close(None))).await;
            break;
        };

        match timeout(timing.write_timeout, sink.send(message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(error = %e, "relay write failed");
                break;
            }
            Err(_) => {
                debug!("relay write timed out");
                break;
            }
        }
    }
}
