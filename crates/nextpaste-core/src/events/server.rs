//! Sync server and client lifecycle event constructors.

use super::AppEvent;
use crate::domain::ClientInfo;

impl AppEvent {
    /// Create a server started event.
    pub fn server_started(address: impl Into<String>, port: u16) -> Self {
        Self::ServerStarted {
            address: address.into(),
            port,
        }
    }

    /// Create a server error event.
    pub fn server_error(error: impl Into<String>) -> Self {
        Self::ServerError {
            error: error.into(),
        }
    }

    /// Create a client connected event.
    pub const fn client_connected(client: ClientInfo) -> Self {
        Self::ClientConnected { client }
    }

    /// Create a client disconnected event.
    pub fn client_disconnected(id: impl Into<String>, device_name: impl Into<String>) -> Self {
        Self::ClientDisconnected {
            id: id.into(),
            device_name: device_name.into(),
        }
    }
}
