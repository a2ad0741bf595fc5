//! Clipboard transfer event constructors.

use super::AppEvent;
use crate::domain::ClipboardContent;

impl AppEvent {
    /// Create a clipboard received event for content sent by `from`.
    pub fn clipboard_received(content: &ClipboardContent, from: impl Into<String>) -> Self {
        Self::ClipboardReceived {
            kind: content.kind,
            bytes: content.data.len(),
            from: from.into(),
        }
    }

    /// Create a clipboard broadcast event.
    pub fn clipboard_broadcast(content: &ClipboardContent) -> Self {
        Self::ClipboardBroadcast {
            kind: content.kind,
            bytes: content.data.len(),
        }
    }
}
