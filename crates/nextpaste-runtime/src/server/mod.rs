//! The sync server: a single `GET /ws` WebSocket endpoint speaking the V1.1
//! binary protocol.
//!
//! [`serve`] runs until the cancellation token fires. The supervisor binds
//! the listener first and passes it in, so callers always learn the real
//! address before any connection is accepted.

mod connection;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::get;
use nextpaste_core::settings::DEFAULT_CHUNK_SIZE;
use nextpaste_core::{AppEventEmitter, ClientInfo, ClipboardContent, LogSinkPort};
use nextpaste_protocol::FrameCodec;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::hub::ClientHub;

/// Called with clipboard content received from a connected device.
pub type ClipboardHandler = Arc<dyn Fn(ClipboardContent, &ClientInfo) + Send + Sync>;

/// Per-connection timing and chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionTiming {
    /// A connection with no inbound traffic (pongs included) for this long
    /// is closed.
    pub read_timeout: Duration,
    pub ping_interval: Duration,
    pub write_timeout: Duration,
    /// Payload size for re-broadcast image chunks.
    pub chunk_size: usize,
}

impl Default for ConnectionTiming {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(30),
            write_timeout: Duration::from_secs(10),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Everything a connection needs.
#[derive(Clone)]
pub struct ServerContext {
    pub hub: Arc<ClientHub>,
    pub codec: Arc<FrameCodec>,
    pub log: Arc<dyn LogSinkPort>,
    pub events: Arc<dyn AppEventEmitter>,
    pub on_clipboard: Option<ClipboardHandler>,
    pub timing: ConnectionTiming,
}

impl std::fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContext")
            .field("hub", &self.hub)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct WsState {
    ctx: ServerContext,
    cancel: CancellationToken,
}

/// Router with the `/ws` endpoint.
///
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router(ctx: ServerContext, cancel: CancellationToken) -> Router {
    Router::new()
        .route("/ws", get(ws_upgrade))
        .with_state(WsState { ctx, cancel })
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<WsState>,
) -> Response {
    ws.on_upgrade(move |socket| connection::run(socket, addr, state.ctx, state.cancel))
}

/// Serve sync connections on `listener` until `cancel` fires.
///
/// On return every registered client has been dropped from the hub.
pub async fn serve(
    listener: TcpListener,
    ctx: ServerContext,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    ctx.log.info(format!("sync server started on {addr} (binary protocol V1.1)"));

    let hub = Arc::clone(&ctx.hub);
    let app = router(ctx, cancel.clone());
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(cancel.cancelled_owned())
    .await;

    let dropped = hub.close_all();
    tracing::debug!(dropped, "sync server loop ended");
    result.map_err(Into::into)
}
