//! Frame construction and parsing for one device.

use std::sync::atomic::{AtomicU32, Ordering};

use bytes::Bytes;
use nextpaste_core::{ClipboardContent, ClipboardKind, DEFAULT_IMAGE_MIME};
use uuid::Uuid;

use crate::error::ProtocolError;
use crate::frame::{self, Frame, FrameFlags, MessageType};
use crate::meta::{HandshakeMeta, TransferMeta};

/// Chunk size used when the caller asks for something unusably small.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

const MIN_CHUNK_SIZE: usize = 1024;

/// Builds frames stamped with this device's UUID and rejects frames that
/// carry it on the way in.
///
/// Message ids start at 1 and increase by one per message; all chunks of
/// one image share an id. The codec is `Sync` so one instance can be shared
/// by every connection of a server.
#[derive(Debug)]
pub struct FrameCodec {
    device_id: [u8; 16],
    msg_counter: AtomicU32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCodec {
    /// Codec with a fresh random device id.
    pub fn new() -> Self {
        Self::with_device_id(*Uuid::new_v4().as_bytes())
    }

    pub const fn with_device_id(device_id: [u8; 16]) -> Self {
        Self {
            device_id,
            msg_counter: AtomicU32::new(0),
        }
    }

    pub const fn device_id(&self) -> &[u8; 16] {
        &self.device_id
    }

    pub const fn device_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.device_id)
    }

    fn next_msg_id(&self) -> u32 {
        self.msg_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    fn pack(
        &self,
        kind: MessageType,
        flags: FrameFlags,
        msg_id: u32,
        seq: u32,
        payload: &[u8],
    ) -> Result<Bytes, ProtocolError> {
        Frame::encode(kind, flags, msg_id, seq, &self.device_id, payload)
    }

    /// Handshake announcing `name` running on `os`.
    pub fn handshake(&self, name: &str, os: &str) -> Result<Bytes, ProtocolError> {
        let payload =
            serde_json::to_vec(&HandshakeMeta::new(name, os)).map_err(ProtocolError::Encode)?;
        self.pack(
            MessageType::Handshake,
            FrameFlags::empty(),
            self.next_msg_id(),
            0,
            &payload,
        )
    }

    pub fn text(&self, text: &str) -> Result<Bytes, ProtocolError> {
        if text.is_empty() {
            return Err(ProtocolError::InvalidInput("text is empty"));
        }
        self.pack(
            MessageType::Text,
            FrameFlags::empty(),
            self.next_msg_id(),
            0,
            text.as_bytes(),
        )
    }

    pub fn heartbeat(&self) -> Result<Bytes, ProtocolError> {
        self.pack(
            MessageType::Heartbeat,
            FrameFlags::empty(),
            self.next_msg_id(),
            0,
            &[],
        )
    }

    /// Whole image in one frame. Only sensible for small images.
    pub fn image_frame(&self, data: &[u8], mime: &str) -> Result<Bytes, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::InvalidInput("image is empty"));
        }
        let meta = TransferMeta::image(mime, data.len());
        self.start_frame(MessageType::Image, self.next_msg_id(), &meta, data, false)
    }

    /// Image split into frames whose payload is at most `chunk_size` bytes.
    ///
    /// Sizes below 1 KiB fall back to 64 KiB. The first frame carries the
    /// metadata and as much data as fits beside it; the rest follow with
    /// sequence numbers from 1 and `MORE_FRAGMENTS` on all but the last.
    pub fn image_chunks(
        &self,
        data: &[u8],
        mime: &str,
        chunk_size: usize,
    ) -> Result<Vec<Bytes>, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::InvalidInput("image is empty"));
        }
        let chunk_size = if chunk_size < MIN_CHUNK_SIZE {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };

        let msg_id = self.next_msg_id();
        let meta = TransferMeta::image(mime, data.len());
        let meta_len = serde_json::to_vec(&meta)
            .map_err(ProtocolError::Encode)?
            .len();
        let first_cap = chunk_size
            .checked_sub(2 + meta_len)
            .ok_or(ProtocolError::MetaTooLarge {
                meta_len,
                chunk_size,
            })?;

        let (first, rest) = data.split_at(first_cap.min(data.len()));
        let mut frames = Vec::with_capacity(1 + rest.len().div_ceil(chunk_size));
        frames.push(self.start_frame(MessageType::Image, msg_id, &meta, first, !rest.is_empty())?);

        let mut pieces = rest.chunks(chunk_size).peekable();
        let mut seq = 1u32;
        while let Some(piece) = pieces.next() {
            let flags = if pieces.peek().is_some() {
                FrameFlags::MORE_FRAGMENTS
            } else {
                FrameFlags::empty()
            };
            frames.push(self.pack(MessageType::Image, flags, msg_id, seq, piece)?);
            seq = seq.wrapping_add(1);
        }

        Ok(frames)
    }

    /// Frames for broadcasting clipboard content: one text frame, or image
    /// chunks.
    pub fn content_frames(
        &self,
        content: &ClipboardContent,
        chunk_size: usize,
    ) -> Result<Vec<Bytes>, ProtocolError> {
        match content.kind {
            ClipboardKind::Text => Ok(vec![self.text(&content.as_text())?]),
            ClipboardKind::Image => {
                self.image_chunks(&content.data, image_mime(content), chunk_size)
            }
        }
    }

    /// Single frame for clipboard content: a text frame or an unchunked image.
    pub fn content_frame(&self, content: &ClipboardContent) -> Result<Bytes, ProtocolError> {
        match content.kind {
            ClipboardKind::Text => self.text(&content.as_text()),
            ClipboardKind::Image => self.image_frame(&content.data, image_mime(content)),
        }
    }

    fn start_frame(
        &self,
        kind: MessageType,
        msg_id: u32,
        meta: &TransferMeta,
        data: &[u8],
        has_more: bool,
    ) -> Result<Bytes, ProtocolError> {
        let meta_json = serde_json::to_vec(meta).map_err(ProtocolError::Encode)?;
        let meta_len = u16::try_from(meta_json.len()).map_err(|_| ProtocolError::MetaTooLarge {
            meta_len: meta_json.len(),
            chunk_size: usize::from(u16::MAX),
        })?;

        let mut payload = Vec::with_capacity(2 + meta_json.len() + data.len());
        payload.extend_from_slice(&meta_len.to_be_bytes());
        payload.extend_from_slice(&meta_json);
        payload.extend_from_slice(data);

        let mut flags = FrameFlags::HAS_META;
        if has_more {
            flags |= FrameFlags::MORE_FRAGMENTS;
        }
        self.pack(kind, flags, msg_id, 0, &payload)
    }

    /// Parse an inbound packet.
    ///
    /// Frames stamped with this codec's device id are rejected as
    /// [`ProtocolError::Loopback`].
    pub fn parse(&self, data: impl Into<Bytes>) -> Result<Frame, ProtocolError> {
        let data = data.into();
        frame::check_header(&data)?;
        if frame::sender_bytes(&data) == self.device_id {
            return Err(ProtocolError::Loopback);
        }
        Frame::decode(data)
    }
}

fn image_mime(content: &ClipboardContent) -> &str {
    if content.mime_type.is_empty() {
        DEFAULT_IMAGE_MIME
    } else {
        &content.mime_type
    }
}
