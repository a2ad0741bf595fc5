//! Protocol error type.

use thiserror::Error;

/// Errors produced while building or parsing frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Fewer bytes than a header.
    #[error("Packet too short: {0} bytes, header needs 33")]
    PacketTooShort(usize),

    /// The first two bytes are not `NP`.
    #[error("Invalid protocol magic: 0x{0:04X}")]
    InvalidMagic(u16),

    /// The frame was sent by this device.
    #[error("Loopback frame from own device")]
    Loopback,

    /// The declared payload length runs past the end of the packet.
    #[error("Incomplete packet: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Transfer metadata is not valid JSON.
    #[error("Failed to parse transfer metadata: {0}")]
    MetaParse(#[source] serde_json::Error),

    /// Handshake payload is not valid JSON.
    #[error("Failed to parse handshake: {0}")]
    Handshake(#[source] serde_json::Error),

    /// A V1.0 JSON envelope or its payload did not parse.
    #[error("Failed to parse legacy message: {0}")]
    Legacy(#[source] serde_json::Error),

    /// Base64 content in a legacy payload did not decode.
    #[error("Invalid base64 content: {0}")]
    Base64(#[source] base64::DecodeError),

    /// Encoding metadata failed.
    #[error("Failed to encode metadata: {0}")]
    Encode(#[source] serde_json::Error),

    /// Empty or otherwise unusable input to a frame builder.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Metadata does not fit into a single frame.
    #[error("Metadata too large ({meta_len} bytes) for chunk size {chunk_size}")]
    MetaTooLarge { meta_len: usize, chunk_size: usize },

    /// A typed accessor was called on a frame of another type.
    #[error("Expected a {expected} frame, got {actual}")]
    WrongType {
        expected: &'static str,
        actual: String,
    },
}
