//! Polling clipboard change monitor.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use nextpaste_core::{
    ClipboardBackend, ClipboardContent, ClipboardError, ClipboardKind, fingerprint,
};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ChangeHandler;

const WATCHED_KINDS: [ClipboardKind; 2] = [ClipboardKind::Text, ClipboardKind::Image];

/// Last seen fingerprint per kind.
#[derive(Debug, Default)]
struct Fingerprints {
    text: String,
    image: String,
}

impl Fingerprints {
    fn slot(&mut self, kind: ClipboardKind) -> &mut String {
        match kind {
            ClipboardKind::Text => &mut self.text,
            ClipboardKind::Image => &mut self.image,
        }
    }
}

struct WatchHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

/// Watches a clipboard backend and reports changes.
///
/// Contents present when watching starts are recorded but not reported.
pub struct ClipboardMonitor {
    backend: Arc<dyn ClipboardBackend>,
    poll_interval: Duration,
    seen: Arc<Mutex<Fingerprints>>,
    watch: tokio::sync::Mutex<Option<WatchHandle>>,
}

impl ClipboardMonitor {
    pub fn new(backend: Arc<dyn ClipboardBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
            seen: Arc::new(Mutex::new(Fingerprints::default())),
            watch: tokio::sync::Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &Arc<dyn ClipboardBackend> {
        &self.backend
    }

    /// Start watching. `on_change` runs on the watch task for every change.
    pub async fn start(&self, on_change: ChangeHandler) -> Result<(), ClipboardError> {
        let mut guard = self.watch.lock().await;
        if guard.as_ref().is_some_and(|w| !w.join.is_finished()) {
            return Err(ClipboardError::AlreadyWatching);
        }

        let mut kinds = Vec::with_capacity(WATCHED_KINDS.len());
        for kind in WATCHED_KINDS {
            match self.backend.read(kind).await {
                Ok(data) => {
                    let fp = data.as_deref().map(fingerprint).unwrap_or_default();
                    *lock(&self.seen).slot(kind) = fp;
                    kinds.push(kind);
                }
                Err(ClipboardError::Unsupported { backend, kind }) => {
                    info!("clipboard backend {backend} does not support {kind}, not watching it");
                }
                Err(e) => {
                    debug!("initial clipboard {kind} read failed: {e}");
                    lock(&self.seen).slot(kind).clear();
                    kinds.push(kind);
                }
            }
        }

        let cancel = CancellationToken::new();
        let join = tokio::spawn(watch_loop(
            Arc::clone(&self.backend),
            Arc::clone(&self.seen),
            kinds,
            self.poll_interval,
            on_change,
            cancel.clone(),
        ));

        info!(
            backend = self.backend.name(),
            interval_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "clipboard monitor started"
        );
        *guard = Some(WatchHandle { cancel, join });
        Ok(())
    }

    /// Stop watching and wait for the watch task. Does nothing if not running.
    pub async fn stop(&self) {
        let Some(watch) = self.watch.lock().await.take() else {
            return;
        };
        watch.cancel.cancel();
        if let Err(e) = watch.join.await {
            warn!("clipboard watch task ended abnormally: {e}");
        }
        info!("clipboard monitor stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.watch
            .lock()
            .await
            .as_ref()
            .is_some_and(|w| !w.join.is_finished())
    }

    /// Write content to the clipboard without reporting it as a change.
    pub async fn set_clipboard(&self, content: &ClipboardContent) -> Result<(), ClipboardError> {
        *lock(&self.seen).slot(content.kind) = fingerprint(&content.data);
        self.backend.write(content.kind, &content.data).await
    }
}

impl std::fmt::Debug for ClipboardMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardMonitor")
            .field("backend", &self.backend.name())
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

fn lock(seen: &Mutex<Fingerprints>) -> std::sync::MutexGuard<'_, Fingerprints> {
    seen.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn watch_loop(
    backend: Arc<dyn ClipboardBackend>,
    seen: Arc<Mutex<Fingerprints>>,
    mut kinds: Vec<ClipboardKind>,
    poll_interval: Duration,
    on_change: ChangeHandler,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let mut unsupported = Vec::new();
        for &kind in &kinds {
            let data = match backend.read(kind).await {
                Ok(Some(data)) if !data.is_empty() => data,
                Ok(_) => continue,
                Err(ClipboardError::Unsupported { .. }) => {
                    unsupported.push(kind);
                    continue;
                }
                Err(e) => {
                    debug!("clipboard {kind} read failed: {e}");
                    continue;
                }
            };

            let fp = fingerprint(&data);
            {
                let mut seen = lock(&seen);
                let slot = seen.slot(kind);
                if *slot == fp {
                    continue;
                }
                *slot = fp;
            }

            let content = match kind {
                ClipboardKind::Text => ClipboardContent {
                    kind,
                    mime_type: kind.default_mime().to_string(),
                    data,
                },
                ClipboardKind::Image => ClipboardContent::png(data),
            };
            on_change(content);
        }
        kinds.retain(|k| !unsupported.contains(k));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use tokio::sync::mpsc;

    const POLL: Duration = Duration::from_millis(20);

    fn channel_handler() -> (ChangeHandler, mpsc::UnboundedReceiver<ClipboardContent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler: ChangeHandler = Arc::new(move |content| {
            let _ = tx.send(content);
        });
        (handler, rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<ClipboardContent>) -> ClipboardContent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for change")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_reports_changes_but_not_initial_contents() {
        let clipboard = Arc::new(MemoryClipboard::new());
        clipboard.set(ClipboardKind::Text, "before");
        let monitor = ClipboardMonitor::new(clipboard.clone(), POLL);
        let (handler, mut rx) = channel_handler();
        monitor.start(handler).await.unwrap();

        tokio::time::sleep(POLL * 3).await;
        assert!(rx.try_recv().is_err());

        clipboard.set(ClipboardKind::Text, "after");
        let content = next(&mut rx).await;
        assert_eq!(content.kind, ClipboardKind::Text);
        assert_eq!(content.as_text(), "after");

        clipboard.set(ClipboardKind::Image, vec![1u8, 2, 3]);
        let content = next(&mut rx).await;
        assert_eq!(content.kind, ClipboardKind::Image);
        assert_eq!(content.mime_type, "image/png");

        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_set_clipboard_is_not_echoed() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let monitor = ClipboardMonitor::new(clipboard.clone(), POLL);
        let (handler, mut rx) = channel_handler();
        monitor.start(handler).await.unwrap();

        monitor
            .set_clipboard(&ClipboardContent::text("from remote"))
            .await
            .unwrap();
        assert_eq!(
            clipboard.get(ClipboardKind::Text).as_deref(),
            Some(&b"from remote"[..])
        );
        tokio::time::sleep(POLL * 5).await;
        assert!(rx.try_recv().is_err());

        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_start_twice_fails_and_stop_is_idempotent() {
        let monitor = ClipboardMonitor::new(Arc::new(MemoryClipboard::new()), POLL);
        let (handler, _rx) = channel_handler();
        monitor.start(handler.clone()).await.unwrap();
        assert!(monitor.is_running().await);
        assert!(matches!(
            monitor.start(handler.clone()).await,
            Err(ClipboardError::AlreadyWatching)
        ));

        monitor.stop().await;
        monitor.stop().await;
        assert!(!monitor.is_running().await);

        monitor.start(handler).await.unwrap();
        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_empty_clipboard_is_ignored() {
        let clipboard = Arc::new(MemoryClipboard::new());
        clipboard.set(ClipboardKind::Text, "x");
        let monitor = ClipboardMonitor::new(clipboard.clone(), POLL);
        let (handler, mut rx) = channel_handler();
        monitor.start(handler).await.unwrap();

        clipboard.set(ClipboardKind::Text, "");
        tokio::time::sleep(POLL * 5).await;
        assert!(rx.try_recv().is_err());

        monitor.stop().await;
    }
}
