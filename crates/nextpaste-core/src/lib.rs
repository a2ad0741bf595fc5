//! Core domain types and port definitions for NextPaste.
//!
//! This crate holds everything the adapters agree on: the records exchanged
//! with the UI, the event union, the port traits the runtime implements,
//! settings, and path resolution. It has no networking or process code.

#![deny(unused_crate_dependencies)]

pub mod bindings;
pub mod domain;
pub mod events;
pub mod fingerprint;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use bindings::{RecordError, RecordSource};
pub use domain::{
    ClientInfo, ClipboardContent, ClipboardKind, DEFAULT_IMAGE_MIME, DEFAULT_TEXT_MIME, LogEntry,
    LogLevel, ServerConfig, ServerStatus, now_millis,
};
pub use events::AppEvent;
pub use fingerprint::fingerprint;
pub use ports::{
    AppEventEmitter, ClipboardBackend, ClipboardError, CoreError, LogSinkPort, NoopEmitter,
    NoopLogSink, ServerError,
};
pub use settings::{Settings, SettingsError, SettingsUpdate, validate_settings};

// Re-export path utilities
pub use paths::{
    DATA_DIR_ENV, PathError, data_root, env_file_path, load_settings, load_settings_from,
    save_settings, save_settings_to, settings_path,
};

// Silence unused dev-dependency warnings for crates only used by some test modules
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio as _;
