//! Supervisor for the sync server lifecycle.
//!
//! The supervisor owns the server state, using `tokio::sync::Mutex` for
//! async-safe access. Adapters (HTTP API, CLI) call methods on it without
//! holding task handles themselves.
//!
//! - **Bind-then-report**: the listener binds first, then the real address
//!   is returned
//! - **Crash detection**: `status()` uses the cancellation token to tell a
//!   clean stop from a task that ended on its own

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result as AnyResult;
use nextpaste_core::{
    AppEventEmitter, ClientInfo, ClipboardContent, LogSinkPort, ServerConfig, ServerError,
    ServerStatus,
};
use nextpaste_protocol::FrameCodec;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::hub::ClientHub;
use crate::server::{self, ClipboardHandler, ConnectionTiming, ServerContext};

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running sync server.
struct SyncHandle {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<AnyResult<()>>,
    bound_addr: SocketAddr,
}

/// Starts, stops and reports on the sync server.
pub struct SyncSupervisor {
    handle: Mutex<Option<SyncHandle>>,
    hub: Arc<ClientHub>,
    codec: Arc<FrameCodec>,
    log: Arc<dyn LogSinkPort>,
    events: Arc<dyn AppEventEmitter>,
    timing: ConnectionTiming,
}

impl SyncSupervisor {
    pub fn new(
        log: Arc<dyn LogSinkPort>,
        events: Arc<dyn AppEventEmitter>,
        timing: ConnectionTiming,
    ) -> Self {
        Self {
            handle: Mutex::new(None),
            hub: Arc::new(ClientHub::new(Arc::clone(&log))),
            codec: Arc::new(FrameCodec::new()),
            log,
            events,
            timing,
        }
    }

    /// Start the sync server.
    ///
    /// Binds first, then spawns the server task. `on_clipboard` receives
    /// content sent by connected devices.
    pub async fn start(
        &self,
        config: &ServerConfig,
        on_clipboard: Option<ClipboardHandler>,
    ) -> Result<SocketAddr, ServerError> {
        let mut guard = self.handle.lock().await;

        if let Some(old) = guard.take() {
            if !old.join_handle.is_finished() {
                let addr = old.bound_addr;
                *guard = Some(old);
                return Err(ServerError::AlreadyRunning(addr));
            }
            match old.join_handle.await {
                Ok(Ok(())) => debug!("Previous sync server task completed normally"),
                Ok(Err(e)) => warn!("Previous sync server task ended with error: {e}"),
                Err(e) => warn!("Previous sync server task panicked: {e}"),
            }
        }

        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            self.log.error(format!("failed to bind {bind_addr}: {e}"));
            ServerError::BindFailed {
                address: bind_addr.clone(),
                reason: e.to_string(),
            }
        })?;

        let bound_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to get local address: {e}")))?;

        info!("Sync server bound to {bound_addr}");

        let cancel_token = CancellationToken::new();
        let ctx = ServerContext {
            hub: Arc::clone(&self.hub),
            codec: Arc::clone(&self.codec),
            log: Arc::clone(&self.log),
            events: Arc::clone(&self.events),
            on_clipboard,
            timing: self.timing,
        };

        let cancel = cancel_token.clone();
        let log = Arc::clone(&self.log);
        let join_handle: JoinHandle<AnyResult<()>> = tokio::spawn(async move {
            let result = server::serve(listener, ctx, cancel).await;
            if let Err(e) = &result {
                log.error(format!("sync server error: {e}"));
            }
            result
        });

        *guard = Some(SyncHandle {
            cancel_token,
            join_handle,
            bound_addr,
        });

        Ok(bound_addr)
    }

    /// Stop the sync server.
    ///
    /// Cancels the server task and waits up to 5 seconds before aborting it.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let mut guard = self.handle.lock().await;

        let Some(handle) = guard.take() else {
            return Err(ServerError::NotRunning);
        };

        info!("Stopping sync server on {}", handle.bound_addr);
        handle.cancel_token.cancel();

        let mut join = handle.join_handle;
        let result = match tokio::time::timeout(STOP_TIMEOUT, &mut join).await {
            Ok(Ok(Ok(()))) => {
                info!("Sync server stopped cleanly");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                error!("Sync server task ended with error: {e}");
                Err(ServerError::Internal(format!("Server error: {e}")))
            }
            Ok(Err(join_err)) => {
                error!("Sync server task panicked: {join_err}");
                Err(ServerError::Internal(format!("Task panicked: {join_err}")))
            }
            Err(_) => {
                warn!("Sync server stop timed out; aborting task");
                join.abort();
                Err(ServerError::Internal(
                    "Server stop timed out; task aborted".into(),
                ))
            }
        };

        self.hub.close_all();
        self.log.info("sync server stopped".to_string());
        result
    }

    /// Current status.
    ///
    /// A task that finished without being cancelled is treated as a crash:
    /// the handle is cleared and the server reported as stopped.
    pub async fn status(&self) -> ServerStatus {
        let mut guard = self.handle.lock().await;

        let Some(handle) = guard.as_ref() else {
            return ServerStatus::stopped();
        };

        if handle.join_handle.is_finished() {
            if !handle.cancel_token.is_cancelled() {
                warn!("Detected crashed sync server, cleaning up handle");
                self.hub.close_all();
            }
            *guard = None;
            ServerStatus::stopped()
        } else {
            ServerStatus::running(self.hub.count())
        }
    }

    pub async fn is_running(&self) -> bool {
        self.status().await.is_running
    }

    /// Bound address if running.
    pub async fn bound_address(&self) -> Option<SocketAddr> {
        let guard = self.handle.lock().await;
        guard
            .as_ref()
            .filter(|h| !h.join_handle.is_finished())
            .map(|h| h.bound_addr)
    }

    /// Broadcast local clipboard content to every connected client.
    ///
    /// Text goes out as one frame, images as chunks. Returns the number of
    /// clients reached.
    pub async fn broadcast_clipboard(&self, content: &ClipboardContent) -> Result<usize, ServerError> {
        if self.bound_address().await.is_none() {
            return Err(ServerError::NotRunning);
        }

        let frames = self
            .codec
            .content_frames(content, self.timing.chunk_size)
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        Ok(self.hub.broadcast(&frames, None))
    }

    /// Connected clients, oldest first.
    pub fn clients(&self) -> Vec<ClientInfo> {
        self.hub.clients()
    }

    pub fn hub(&self) -> &Arc<ClientHub> {
        &self.hub
    }

    pub const fn timing(&self) -> ConnectionTiming {
        self.timing
    }
}

impl std::fmt::Debug for SyncSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSupervisor").finish_non_exhaustive()
    }
}
