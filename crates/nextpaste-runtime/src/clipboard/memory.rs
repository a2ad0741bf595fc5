//! In-process clipboard.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use nextpaste_core::{ClipboardBackend, ClipboardError, ClipboardKind};

/// Clipboard held in memory.
///
/// Like a system clipboard it holds a single item: writing one kind clears
/// the other. Used by tests and by hosts without a clipboard tool.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RwLock<HashMap<ClipboardKind, Bytes>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents without going through the async port.
    pub fn set(&self, kind: ClipboardKind, data: impl Into<Bytes>) {
        let mut contents = self
            .contents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        contents.clear();
        contents.insert(kind, data.into());
    }

    /// Current contents of the given kind.
    pub fn get(&self, kind: ClipboardKind) -> Option<Bytes> {
        self.contents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }
}

#[async_trait]
impl ClipboardBackend for MemoryClipboard {
    async fn read(&self, kind: ClipboardKind) -> Result<Option<Bytes>, ClipboardError> {
        Ok(self.get(kind))
    }

    async fn write(&self, kind: ClipboardKind, data: &[u8]) -> Result<(), ClipboardError> {
        self.set(kind, Bytes::copy_from_slice(data));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
