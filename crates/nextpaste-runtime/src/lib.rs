//! NextPaste runtime: everything that touches sockets, the clipboard, or
//! background tasks.
//!
//! - [`SyncSupervisor`] owns the sync server lifecycle
//! - [`ClientHub`] tracks connected devices and fans frames out to them
//! - [`ClipboardMonitor`] polls a [`ClipboardBackend`] for local changes
//! - [`SyncClient`] connects this device to another server or a relay
//! - [`SyncService`] wires the above together for the desktop/web host
//!
//! [`ClipboardBackend`]: nextpaste_core::ClipboardBackend

#![deny(unused_crate_dependencies)]

pub mod client;
pub mod clipboard;
pub mod hub;
pub mod logs;
pub mod network;
pub mod server;
pub mod service;
pub mod supervisor;

pub use client::{ClientError, ClientOptions, SyncClient};
pub use clipboard::{
    ChangeHandler, ClipboardMonitor, ClipboardTool, CommandClipboard, MemoryClipboard,
    system_backend,
};
pub use hub::{ClientHub, SEND_QUEUE_CAPACITY};
pub use logs::ActivityLog;
pub use network::{host_name, local_ips, platform_name};
pub use server::{ClipboardHandler, ConnectionTiming, ServerContext, serve};
pub use service::{ServiceOptions, SyncService};
pub use supervisor::SyncSupervisor;

#[cfg(test)]
use tokio_test as _;
