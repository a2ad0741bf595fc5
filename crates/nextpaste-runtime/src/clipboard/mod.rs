//! Clipboard backends and the change monitor.
//!
//! Backends implement [`nextpaste_core::ClipboardBackend`]. The monitor polls
//! one of them and reports changes; the sync service writes remote content
//! back through the monitor so those writes are not echoed.

mod command;
mod memory;
mod monitor;

use std::sync::Arc;

use nextpaste_core::{ClipboardBackend, ClipboardContent};

pub use command::{ClipboardTool, CommandClipboard};
pub use memory::MemoryClipboard;
pub use monitor::ClipboardMonitor;

/// Callback invoked with the new contents when the local clipboard changes.
pub type ChangeHandler = Arc<dyn Fn(ClipboardContent) + Send + Sync>;

/// The host clipboard through its command-line tool.
///
/// Falls back to an in-process [`MemoryClipboard`] when no tool is
/// installed, so the server still relays between remote devices.
pub fn system_backend() -> Arc<dyn ClipboardBackend> {
    match CommandClipboard::detect() {
        Ok(clipboard) => {
            tracing::info!(tool = clipboard.tool().name(), "using system clipboard");
            Arc::new(clipboard)
        }
        Err(e) => {
            tracing::warn!("{e}; local clipboard sync disabled");
            Arc::new(MemoryClipboard::new())
        }
    }
}
