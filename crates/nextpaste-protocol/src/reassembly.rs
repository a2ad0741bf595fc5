//! Reassembly of chunked image transfers.

use bytes::{Bytes, BytesMut};
use nextpaste_core::{ClipboardContent, DEFAULT_IMAGE_MIME};

use crate::frame::Frame;

/// Cap on the buffer reserved up front from the declared size.
pub const MAX_PREALLOC: usize = 100 * 1024 * 1024;

/// A fully received image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedImage {
    pub msg_id: u32,
    pub mime: String,
    pub data: Bytes,
}

impl CompletedImage {
    pub fn into_content(self) -> ClipboardContent {
        ClipboardContent::image(self.data, self.mime)
    }
}

/// Result of feeding one frame to an [`ImageAssembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// More fragments are expected. `restarted` is set when this frame
    /// began a new transfer over an unfinished one.
    Pending { restarted: bool },
    /// The transfer is complete.
    Complete {
        image: CompletedImage,
        restarted: bool,
    },
    /// Continuation frame with no transfer in progress.
    Ignored,
    /// Continuation frame for another message; the pending transfer was
    /// discarded.
    Dropped { pending: u32, received: u32 },
}

#[derive(Debug)]
struct PendingTransfer {
    msg_id: u32,
    mime: Option<String>,
    buffer: BytesMut,
}

/// Per-connection reassembly state. One transfer at a time.
#[derive(Debug, Default)]
pub struct ImageAssembler {
    pending: Option<PendingTransfer>,
}

impl ImageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// Feed an image frame.
    pub fn push(&mut self, frame: &Frame) -> AssemblyOutcome {
        let restarted = if frame.has_meta() {
            let restarted = self.pending.is_some();
            let meta = frame.meta.as_ref();
            let expected = meta
                .and_then(|m| m.size)
                .map_or(0, |size| usize::try_from(size).unwrap_or(MAX_PREALLOC))
                .min(MAX_PREALLOC);

            let mut buffer = BytesMut::with_capacity(expected);
            buffer.extend_from_slice(frame.body.as_ref().unwrap_or(&frame.payload));
            self.pending = Some(PendingTransfer {
                msg_id: frame.msg_id,
                mime: meta.and_then(|m| m.mime.clone()),
                buffer,
            });
            restarted
        } else {
            let Some(pending) = self.pending.as_mut() else {
                return AssemblyOutcome::Ignored;
            };
            if pending.msg_id != frame.msg_id {
                let pending = pending.msg_id;
                self.pending = None;
                return AssemblyOutcome::Dropped {
                    pending,
                    received: frame.msg_id,
                };
            }
            pending.buffer.extend_from_slice(&frame.payload);
            false
        };

        if frame.has_more() {
            return AssemblyOutcome::Pending { restarted };
        }

        match self.pending.take() {
            Some(done) => AssemblyOutcome::Complete {
                image: CompletedImage {
                    msg_id: done.msg_id,
                    mime: done
                        .mime
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
                    data: done.buffer.freeze(),
                },
                restarted,
            },
            None => AssemblyOutcome::Ignored,
        }
    }
}
