//! Port definitions (trait abstractions) for external systems.
//!
//! Ports keep the runtime independent of the concrete clipboard, the event
//! transport (SSE, logging), and the log destination. Implementations live
//! in `nextpaste-runtime` and the adapter crates.

mod clipboard;
mod event_emitter;
mod log_sink;

use std::net::SocketAddr;

use thiserror::Error;

pub use clipboard::{ClipboardBackend, ClipboardError};
pub use event_emitter::{AppEventEmitter, NoopEmitter};
pub use log_sink::{LogSinkPort, NoopLogSink};

/// Errors from sync server lifecycle operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server is already running.
    #[error("Server is already running on {0}")]
    AlreadyRunning(SocketAddr),

    /// Failed to bind to the address.
    #[error("Failed to bind to {address}: {reason}")]
    BindFailed { address: String, reason: String },

    /// The server is not running.
    #[error("Server is not running")]
    NotRunning,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (HTTP status codes, CLI exit
/// codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Server lifecycle failure.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Clipboard access failure.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::paths::PathError> for CoreError {
    fn from(err: crate::paths::PathError) -> Self {
        Self::Configuration(err.to_string())
    }
}
