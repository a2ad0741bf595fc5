//! Domain records shared by the runtime, the HTTP adapter, and the UI.
//!
//! These are pure value types with no infrastructure dependencies. Field
//! names on the wire are camelCase to match the frontend.

mod client;
mod clipboard;
mod log;
mod server;

pub use client::ClientInfo;
pub use clipboard::{ClipboardContent, ClipboardKind, DEFAULT_IMAGE_MIME, DEFAULT_TEXT_MIME};
pub use log::{LogEntry, LogLevel, now_millis};
pub use server::{DEFAULT_ADDRESS, DEFAULT_PORT, ServerConfig, ServerStatus};
