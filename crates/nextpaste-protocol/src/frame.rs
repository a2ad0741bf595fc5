//! V1.1 binary frame layout.
//!
//! ```text
//! offset  size  field
//!   0      2    magic 0x4E50 ("NP")
//!   2      1    version (high nibble) | type (low nibble)
//!   3      1    flags
//!   4      1    reserved
//!   5      4    message id
//!   9      4    sequence
//!  13     16    sender uuid
//!  29      4    payload length
//!  33      n    payload
//! ```
//!
//! All integers are big-endian.

use std::fmt;

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;
use crate::meta::{HandshakeMeta, TransferMeta};

/// Protocol magic, ASCII `NP`.
pub const MAGIC: u16 = 0x4E50;

/// Version written into the high nibble of byte 2.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 33;

const SENDER_RANGE: std::ops::Range<usize> = 13..29;

/// Frame type (low nibble of byte 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Heartbeat,
    Handshake,
    Text,
    Image,
    File,
    Unknown(u8),
}

impl MessageType {
    pub const fn from_nibble(value: u8) -> Self {
        match value & 0x0F {
            0x0 => Self::Heartbeat,
            0x1 => Self::Handshake,
            0x2 => Self::Text,
            0x3 => Self::Image,
            0x4 => Self::File,
            other => Self::Unknown(other),
        }
    }

    pub const fn nibble(self) -> u8 {
        match self {
            Self::Heartbeat => 0x0,
            Self::Handshake => 0x1,
            Self::Text => 0x2,
            Self::Image => 0x3,
            Self::File => 0x4,
            Self::Unknown(v) => v & 0x0F,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heartbeat => f.write_str("heartbeat"),
            Self::Handshake => f.write_str("handshake"),
            Self::Text => f.write_str("text"),
            Self::Image => f.write_str("image"),
            Self::File => f.write_str("file"),
            Self::Unknown(v) => write!(f, "0x{v:02X}"),
        }
    }
}

bitflags! {
    /// Header flags (byte 3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[repr(transparent)]
    pub struct FrameFlags: u8 {
        /// More fragments of this message follow.
        const MORE_FRAGMENTS = 0x01;
        /// Payload starts with `u16 metaLen` + JSON metadata.
        const HAS_META       = 0x02;
    }
}

/// A parsed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub version: u8,
    pub kind: MessageType,
    pub flags: FrameFlags,
    pub msg_id: u32,
    pub seq: u32,
    pub sender: [u8; 16],
    /// Whole payload, metadata prefix included.
    pub payload: Bytes,
    /// Transfer metadata when `HAS_META` is set and it fits.
    pub meta: Option<TransferMeta>,
    /// Payload with the metadata prefix stripped.
    pub body: Option<Bytes>,
}

impl Frame {
    /// Serialize a frame.
    pub fn encode(
        kind: MessageType,
        flags: FrameFlags,
        msg_id: u32,
        seq: u32,
        sender: &[u8; 16],
        payload: &[u8],
    ) -> Result<Bytes, ProtocolError> {
        let payload_len = u32::try_from(payload.len())
            .map_err(|_| ProtocolError::InvalidInput("payload exceeds 4 GiB"))?;

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        buf.put_u16(MAGIC);
        buf.put_u8((PROTOCOL_VERSION << 4) | kind.nibble());
        buf.put_u8(flags.bits());
        buf.put_u8(0);
        buf.put_u32(msg_id);
        buf.put_u32(seq);
        buf.put_slice(sender);
        buf.put_u32(payload_len);
        buf.put_slice(payload);
        Ok(buf.freeze())
    }

    /// Parse a frame without any loopback check.
    pub fn decode(data: Bytes) -> Result<Self, ProtocolError> {
        check_header(&data)?;

        let mut header = &data[..HEADER_SIZE];
        let _magic = header.get_u16();
        let ver_type = header.get_u8();
        let flags = FrameFlags::from_bits_retain(header.get_u8());
        let _reserved = header.get_u8();
        let msg_id = header.get_u32();
        let seq = header.get_u32();
        let mut sender = [0u8; 16];
        header.copy_to_slice(&mut sender);
        let payload_len = header.get_u32() as usize;

        let expected = HEADER_SIZE + payload_len;
        if data.len() < expected {
            return Err(ProtocolError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        let payload = data.slice(HEADER_SIZE..expected);

        let (meta, body) = if flags.contains(FrameFlags::HAS_META) {
            split_meta(&payload)?
        } else {
            (None, None)
        };

        Ok(Self {
            version: ver_type >> 4,
            kind: MessageType::from_nibble(ver_type),
            flags,
            msg_id,
            seq,
            sender,
            payload,
            meta,
            body,
        })
    }

    pub const fn has_more(&self) -> bool {
        self.flags.contains(FrameFlags::MORE_FRAGMENTS)
    }

    pub const fn has_meta(&self) -> bool {
        self.flags.contains(FrameFlags::HAS_META)
    }

    /// Text of a text frame; `None` for other types.
    pub fn text_content(&self) -> Option<String> {
        (self.kind == MessageType::Text)
            .then(|| String::from_utf8_lossy(&self.payload).into_owned())
    }

    /// Handshake metadata of a handshake frame.
    pub fn handshake_meta(&self) -> Result<HandshakeMeta, ProtocolError> {
        if self.kind != MessageType::Handshake {
            return Err(ProtocolError::WrongType {
                expected: "handshake",
                actual: self.kind.to_string(),
            });
        }
        serde_json::from_slice(&self.payload).map_err(ProtocolError::Handshake)
    }

    /// Image bytes of an image frame: the body when metadata was stripped,
    /// the whole payload otherwise.
    pub fn image_data(&self) -> Option<Bytes> {
        if self.kind != MessageType::Image {
            return None;
        }
        Some(self.body.clone().unwrap_or_else(|| self.payload.clone()))
    }
}

/// Length and magic checks shared by [`Frame::decode`] and the codec.
pub(crate) fn check_header(data: &[u8]) -> Result<(), ProtocolError> {
    if data.len() < HEADER_SIZE {
        return Err(ProtocolError::PacketTooShort(data.len()));
    }
    let magic = u16::from_be_bytes([data[0], data[1]]);
    if magic != MAGIC {
        return Err(ProtocolError::InvalidMagic(magic));
    }
    Ok(())
}

/// Sender UUID bytes of a packet that passed [`check_header`].
pub(crate) fn sender_bytes(data: &[u8]) -> &[u8] {
    &data[SENDER_RANGE]
}

fn split_meta(payload: &Bytes) -> Result<(Option<TransferMeta>, Option<Bytes>), ProtocolError> {
    if payload.len() < 2 {
        return Ok((None, None));
    }
    let meta_len = usize::from(u16::from_be_bytes([payload[0], payload[1]]));
    let meta_end = 2 + meta_len;
    if payload.len() < meta_end {
        return Ok((None, None));
    }
    let meta: TransferMeta =
        serde_json::from_slice(&payload[2..meta_end]).map_err(ProtocolError::MetaParse)?;
    Ok((Some(meta), Some(payload.slice(meta_end..))))
}
