//! Canonical event union for all cross-adapter events.
//!
//! This module is the single source of truth for events pushed to the UI by
//! the SSE handler and mirrored to logs by the CLI.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag for TypeScript compatibility:
//!
//! ```json
//! { "type": "server_started", "address": "0.0.0.0", "port": 8080 }
//! ```

mod clipboard;
mod server;

use serde::{Deserialize, Serialize};

use crate::domain::{ClientInfo, ClipboardKind, LogEntry};

/// Canonical event types for all adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    // ========== Activity Log ==========
    /// The activity log changed; carries the full newest-first list.
    LogsUpdated {
        /// Current log entries, newest first.
        logs: Vec<LogEntry>,
    },

    // ========== Server Events ==========
    /// The sync server is bound and accepting connections.
    ServerStarted {
        /// Bound address (IP part).
        address: String,
        /// Bound port (real port when 0 was requested).
        port: u16,
    },

    /// The sync server stopped.
    ServerStopped,

    /// The sync server ended with an error.
    ServerError {
        /// Error description.
        error: String,
    },

    // ========== Client Events ==========
    /// A device connected.
    ClientConnected {
        /// The connected device.
        client: ClientInfo,
    },

    /// A device disconnected.
    ClientDisconnected {
        /// Connection id.
        id: String,
        /// Device name announced in the handshake (may be empty).
        #[serde(rename = "deviceName")]
        device_name: String,
    },

    // ========== Clipboard Events ==========
    /// Clipboard content arrived from a remote device.
    ClipboardReceived {
        kind: ClipboardKind,
        /// Payload size in bytes.
        bytes: usize,
        /// Device name of the sender.
        from: String,
    },

    /// Local clipboard content was broadcast to connected devices.
    ClipboardBroadcast {
        kind: ClipboardKind,
        /// Payload size in bytes.
        bytes: usize,
    },
}

impl AppEvent {
    /// Event channel name used by the UI listeners.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::LogsUpdated { .. } => "logs:updated",
            Self::ServerStarted { .. } => "server:started",
            Self::ServerStopped => "server:stopped",
            Self::ServerError { .. } => "server:error",
            Self::ClientConnected { .. } => "client:connected",
            Self::ClientDisconnected { .. } => "client:disconnected",
            Self::ClipboardReceived { .. } => "clipboard:received",
            Self::ClipboardBroadcast { .. } => "clipboard:broadcast",
        }
    }

    /// Create a logs-updated event.
    pub const fn logs_updated(logs: Vec<LogEntry>) -> Self {
        Self::LogsUpdated { logs }
    }
}
