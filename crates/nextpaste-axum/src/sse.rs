//! SSE event broadcaster for real-time event streaming.
//!
//! The broadcaster is the [`AppEventEmitter`] handed to the sync service,
//! so every server, client, clipboard and log event is streamed to the
//! connected web clients.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use nextpaste_core::{AppEvent, AppEventEmitter};
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// Interval between keep-alive comments on idle streams.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// SSE broadcaster that implements the event emitter port.
///
/// Events are sent via a broadcast channel and streamed to connected clients.
/// Multiple clients can receive the same events simultaneously.
#[derive(Debug, Clone)]
pub struct SseBroadcaster {
    sender: broadcast::Sender<AppEvent>,
}

impl SseBroadcaster {
    /// Create a broadcaster buffering up to `capacity` events.
    ///
    /// Slow clients miss events once the buffer overflows.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new SSE broadcaster with default capacity (256 events).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(256)
    }

    /// Create an SSE stream for a new client connection.
    ///
    /// Each event is sent under its channel name (`event: logs:updated`)
    /// with one `data:` line of JSON. A keep-alive comment goes out every
    /// 30 seconds.
    pub fn subscribe(
        self: Arc<Self>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
        let stream = self.raw_stream().map(Ok::<Event, Infallible>);
        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(KEEP_ALIVE_INTERVAL)
                .text("ping"),
        )
    }

    fn raw_stream(&self) -> impl Stream<Item = Event> + Send + use<> {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|result| match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Event::default().event(event.event_name()).data(json)),
                Err(e) => {
                    tracing::warn!("Failed to serialize event: {e}");
                    None
                }
            },
            Err(e) => {
                // Lagged receivers skip ahead
                tracing::debug!("SSE stream error: {e}");
                None
            }
        })
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl AppEventEmitter for SseBroadcaster {
    fn emit(&self, event: AppEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    fn clone_box(&self) -> Box<dyn AppEventEmitter> {
        Box::new(self.clone())
    }
}
