//! `SyncService`: the host-side application facade.
//!
//! Composes the sync supervisor, the clipboard monitor and the activity
//! log. Adapters (HTTP API, CLI) hold one `SyncService` and call it; they
//! never touch the pieces directly.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use nextpaste_core::{
    AppEvent, AppEventEmitter, ClientInfo, ClipboardBackend, ClipboardContent, ClipboardKind,
    CoreError, LogEntry, LogSinkPort, ServerConfig, ServerError, ServerStatus, Settings,
};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::clipboard::{ChangeHandler, ClipboardMonitor};
use crate::logs::ActivityLog;
use crate::network;
use crate::server::{ClipboardHandler, ConnectionTiming};
use crate::supervisor::SyncSupervisor;

/// Tunables for a [`SyncService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub timing: ConnectionTiming,
    pub poll_interval: Duration,
    pub max_logs: usize,
}

impl ServiceOptions {
    /// Options from the effective values of `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timing: ConnectionTiming {
                chunk_size: settings.effective_chunk_size(),
                ..ConnectionTiming::default()
            },
            poll_interval: Duration::from_millis(settings.effective_poll_interval_ms()),
            max_logs: settings.effective_max_logs(),
        }
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Host-side facade over the sync server and the local clipboard.
pub struct SyncService {
    supervisor: Arc<SyncSupervisor>,
    monitor: Arc<ClipboardMonitor>,
    log: Arc<ActivityLog>,
    events: Arc<dyn AppEventEmitter>,
    lifecycle: Mutex<()>,
}

impl SyncService {
    pub fn new(
        backend: Arc<dyn ClipboardBackend>,
        events: Arc<dyn AppEventEmitter>,
        options: ServiceOptions,
    ) -> Self {
        let log = Arc::new(ActivityLog::new(options.max_logs, Arc::clone(&events)));
        let sink: Arc<dyn LogSinkPort> = log.clone();
        Self {
            supervisor: Arc::new(SyncSupervisor::new(
                sink,
                Arc::clone(&events),
                options.timing,
            )),
            monitor: Arc::new(ClipboardMonitor::new(backend, options.poll_interval)),
            log,
            events,
            lifecycle: Mutex::new(()),
        }
    }

    /// Start the sync server and begin watching the local clipboard.
    ///
    /// If the clipboard monitor cannot start, the server is stopped again
    /// and the monitor error returned.
    pub async fn start_server(&self, config: &ServerConfig) -> Result<SocketAddr, CoreError> {
        let _lifecycle = self.lifecycle.lock().await;

        if let Some(addr) = self.supervisor.bound_address().await {
            return Err(ServerError::AlreadyRunning(addr).into());
        }

        let addr = self
            .supervisor
            .start(config, Some(self.inbound_handler()))
            .await?;

        if let Err(e) = self.monitor.start(self.change_handler()).await {
            self.log.error(format!("failed to start clipboard monitor: {e}"));
            if let Err(stop_err) = self.supervisor.stop().await {
                debug!("stopping server after monitor failure: {stop_err}");
            }
            return Err(e.into());
        }

        self.events.emit(AppEvent::server_started(addr.ip().to_string(), addr.port()));
        Ok(addr)
    }

    /// Stop watching the clipboard and stop the sync server.
    ///
    /// Stopping a server that is not running succeeds.
    pub async fn stop_server(&self) -> Result<(), CoreError> {
        let _lifecycle = self.lifecycle.lock().await;

        self.monitor.stop().await;
        match self.supervisor.stop().await {
            Ok(()) => {}
            Err(ServerError::NotRunning) => return Ok(()),
            Err(e) => {
                self.events.emit(AppEvent::server_error(e.to_string()));
                return Err(e.into());
            }
        }
        self.events.emit(AppEvent::ServerStopped);
        Ok(())
    }

    pub async fn server_status(&self) -> ServerStatus {
        self.supervisor.status().await
    }

    pub async fn bound_address(&self) -> Option<SocketAddr> {
        self.supervisor.bound_address().await
    }

    /// Non-loopback IPv4 addresses of this host.
    pub fn local_ips(&self) -> Vec<String> {
        network::local_ips()
    }

    /// Activity log, newest first.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.log.entries()
    }

    pub fn clear_logs(&self) {
        self.log.clear();
    }

    pub fn clients(&self) -> Vec<ClientInfo> {
        self.supervisor.clients()
    }

    pub fn activity_log(&self) -> &Arc<ActivityLog> {
        &self.log
    }

    /// Stop everything. Errors are logged, not returned.
    pub async fn shutdown(&self) {
        if let Err(e) = self.stop_server().await {
            self.log.error(format!("error during shutdown: {e}"));
        }
    }

    /// Writes content from remote devices to the local clipboard.
    ///
    /// A single writer task applies the writes in arrival order. It exits
    /// once the returned handler is dropped.
    fn inbound_handler(&self) -> ClipboardHandler {
        let (tx, mut rx) = mpsc::unbounded_channel::<(ClipboardContent, String)>();
        let monitor = Arc::clone(&self.monitor);
        let log = Arc::clone(&self.log);
        tokio::spawn(async move {
            while let Some((content, from)) = rx.recv().await {
                match monitor.set_clipboard(&content).await {
                    Ok(()) => log.success(format!(
                        "synced {} from {from} to local clipboard",
                        content.kind
                    )),
                    Err(e) => log.error(format!("failed to set clipboard: {e}")),
                }
            }
        });

        Arc::new(move |content: ClipboardContent, from: &ClientInfo| {
            if tx.send((content, from.display_name().to_string())).is_err() {
                debug!("clipboard writer has stopped, inbound content dropped");
            }
        })
    }

    /// Broadcasts local clipboard changes to every connected device.
    fn change_handler(&self) -> ChangeHandler {
        let supervisor = Arc::clone(&self.supervisor);
        let log = Arc::clone(&self.log);
        let events = Arc::clone(&self.events);
        Arc::new(move |content: ClipboardContent| {
            match content.kind {
                ClipboardKind::Text => {
                    log.info(format!("clipboard text changed: {} chars", content.len()));
                }
                ClipboardKind::Image => log.info("clipboard image changed".to_string()),
            }

            let supervisor = Arc::clone(&supervisor);
            let log = Arc::clone(&log);
            let events = Arc::clone(&events);
            tokio::spawn(async move {
                match supervisor.broadcast_clipboard(&content).await {
                    Ok(reached) => {
                        debug!(kind = %content.kind, reached, "clipboard broadcast");
                        events.emit(AppEvent::clipboard_broadcast(&content));
                    }
                    Err(e) => log.error(format!("failed to broadcast clipboard: {e}")),
                }
            });
        })
    }
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("supervisor", &self.supervisor)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use nextpaste_core::{ClipboardError, NoopEmitter};
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recorder {
        events: StdMutex<Vec<AppEvent>>,
    }

    impl Recorder {
        fn names(&self) -> Vec<&'static str> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| !matches!(e, AppEvent::LogsUpdated { .. }))
                .map(AppEvent::event_name)
                .collect()
        }
    }

    struct Forward(Arc<Recorder>);

    impl AppEventEmitter for Forward {
        fn emit(&self, event: AppEvent) {
            self.0.events.lock().unwrap().push(event);
        }

        fn clone_box(&self) -> Box<dyn AppEventEmitter> {
            Box::new(Self(Arc::clone(&self.0)))
        }
    }

    fn local() -> ServerConfig {
        ServerConfig::new("127.0.0.1", 0)
    }

    fn service() -> SyncService {
        SyncService::new(
            Arc::new(MemoryClipboard::new()),
            Arc::new(NoopEmitter::new()),
            ServiceOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_start_and_stop_emit_lifecycle_events() {
        let recorder = Arc::new(Recorder::default());
        let service = SyncService::new(
            Arc::new(MemoryClipboard::new()),
            Arc::new(Forward(Arc::clone(&recorder))),
            ServiceOptions::default(),
        );

        let addr = service.start_server(&local()).await.unwrap();
        assert_eq!(service.server_status().await, ServerStatus::running(0));
        assert_eq!(service.bound_address().await, Some(addr));

        service.stop_server().await.unwrap();
        assert_eq!(service.server_status().await, ServerStatus::stopped());
        assert_eq!(recorder.names(), vec!["server:started", "server:stopped"]);
        assert!(!service.logs().is_empty());
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let service = service();
        let addr = service.start_server(&local()).await.unwrap();
        let err = service.start_server(&local()).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Server(ServerError::AlreadyRunning(a)) if a == addr
        ));
        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_stop_when_stopped_is_ok() {
        let service = service();
        service.stop_server().await.unwrap();
        service.start_server(&local()).await.unwrap();
        service.stop_server().await.unwrap();
        service.stop_server().await.unwrap();
    }

    #[tokio::test]
    async fn test_monitor_failure_stops_the_server() {
        let service = service();
        // Occupy the monitor so the service cannot start it.
        service
            .monitor
            .start(Arc::new(|_: ClipboardContent| {}))
            .await
            .unwrap();

        let err = service.start_server(&local()).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Clipboard(ClipboardError::AlreadyWatching)
        ));
        assert!(!service.server_status().await.is_running);
        service.monitor.stop().await;
    }

    /// Stalls the write of `"first"` so a later write could overtake it.
    struct SlowFirst {
        inner: MemoryClipboard,
        writes: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ClipboardBackend for SlowFirst {
        async fn read(&self, kind: ClipboardKind) -> Result<Option<bytes::Bytes>, ClipboardError> {
            self.inner.read(kind).await
        }

        async fn write(&self, kind: ClipboardKind, data: &[u8]) -> Result<(), ClipboardError> {
            if data == b"first" {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            self.inner.write(kind, data).await?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "slow-first"
        }
    }

    #[tokio::test]
    async fn test_inbound_writes_keep_arrival_order() {
        let backend = Arc::new(SlowFirst {
            inner: MemoryClipboard::new(),
            writes: AtomicUsize::new(0),
        });
        let service = SyncService::new(
            backend.clone(),
            Arc::new(NoopEmitter::new()),
            ServiceOptions::default(),
        );
        let from = ClientInfo::connected("peer", chrono::Local::now());

        let handler = service.inbound_handler();
        handler(ClipboardContent::text("first"), &from);
        handler(ClipboardContent::text("second"), &from);

        tokio::time::timeout(Duration::from_secs(2), async {
            while backend.writes.load(Ordering::SeqCst) < 2 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(
            backend.inner.get(ClipboardKind::Text).as_deref(),
            Some(&b"second"[..])
        );
    }

    #[tokio::test]
    async fn test_clear_logs() {
        let service = service();
        service.start_server(&local()).await.unwrap();
        service.shutdown().await;
        assert!(!service.logs().is_empty());
        service.clear_logs();
        assert!(service.logs().is_empty());
    }
}
