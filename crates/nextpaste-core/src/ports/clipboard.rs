//! Clipboard backend port.
//!
//! The clipboard monitor and the sync service only see this trait. Concrete
//! backends (in-memory, platform command-line tools) live in the runtime.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::domain::ClipboardKind;

/// Errors from clipboard access.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// No usable clipboard tool was found on this host.
    #[error("No clipboard backend available: {0}")]
    Unavailable(String),

    /// The backend cannot handle this kind of content.
    #[error("Clipboard backend '{backend}' does not support {kind}")]
    Unsupported {
        backend: &'static str,
        kind: ClipboardKind,
    },

    /// Reading the clipboard failed.
    #[error("Failed to read clipboard: {0}")]
    Read(String),

    /// Writing the clipboard failed.
    #[error("Failed to write clipboard: {0}")]
    Write(String),

    /// The monitor is already watching.
    #[error("Clipboard monitor is already running")]
    AlreadyWatching,
}

/// Access to the system clipboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClipboardBackend: Send + Sync {
    /// Read the current clipboard contents of the given kind.
    ///
    /// Returns `Ok(None)` when the clipboard holds nothing of that kind.
    async fn read(&self, kind: ClipboardKind) -> Result<Option<Bytes>, ClipboardError>;

    /// Replace the clipboard contents.
    async fn write(&self, kind: ClipboardKind, data: &[u8]) -> Result<(), ClipboardError>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_mock_backend_as_trait_object() {
        let mut mock = MockClipboardBackend::new();
        mock.expect_read()
            .withf(|kind| *kind == ClipboardKind::Text)
            .returning(|_| Ok(Some(Bytes::from_static(b"hello"))));
        mock.expect_name().return_const("mock");

        let backend: Arc<dyn ClipboardBackend> = Arc::new(mock);
        let data = backend.read(ClipboardKind::Text).await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"hello"[..]));
        assert_eq!(backend.name(), "mock");
    }

    #[test]
    fn test_unsupported_message() {
        let err = ClipboardError::Unsupported {
            backend: "pbcopy",
            kind: ClipboardKind::Image,
        };
        assert_eq!(
            err.to_string(),
            "Clipboard backend 'pbcopy' does not support image"
        );
    }
}
