//! NextPaste wire protocol.
//!
//! - [`frame`]: the 33-byte V1.1 header and parsed [`Frame`]s
//! - [`codec`]: [`FrameCodec`], which builds frames for one device and
//!   rejects its own frames on the way back in
//! - [`reassembly`]: [`ImageAssembler`] for chunked image transfers
//! - [`legacy`]: the V1.0 JSON envelope still spoken by relays and older
//!   clients
//!
//! The crate does no I/O. Transports hand it whole WebSocket binary
//! messages and get whole messages back.

#![deny(unused_crate_dependencies)]

pub mod codec;
pub mod error;
pub mod frame;
pub mod legacy;
pub mod meta;
pub mod reassembly;

pub use codec::FrameCodec;
pub use error::ProtocolError;
pub use frame::{Frame, FrameFlags, HEADER_SIZE, MAGIC, MessageType, PROTOCOL_VERSION};
pub use legacy::{
    ClipboardPayload, HandshakePayload, HeartbeatPayload, LegacyDataType, SyncAction, SyncMessage,
};
pub use meta::{HANDSHAKE_VERSION, HandshakeMeta, TransferMeta};
pub use reassembly::{AssemblyOutcome, CompletedImage, ImageAssembler, MAX_PREALLOC};
