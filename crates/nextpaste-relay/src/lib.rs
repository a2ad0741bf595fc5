//! NextPaste relay: a rendezvous for devices on different networks.
//!
//! Clients join a room at `/ws/{roomId}`; every message a member sends is
//! forwarded unchanged to the other members of the same room. Rooms exist
//! only while they have members.

#![deny(unused_crate_dependencies)]

mod page;
pub mod rooms;
pub mod server;

pub use rooms::{RelayStats, RoomRegistry, RoomStats, SEND_QUEUE_CAPACITY};
pub use server::{RelayServer, RelayTiming, serve};

#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tokio_tungstenite as _;
