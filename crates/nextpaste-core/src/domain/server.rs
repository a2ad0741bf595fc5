//! Sync server configuration and status records.

use serde::{Deserialize, Serialize};

/// Default bind address for the sync server.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default port for the sync server.
pub const DEFAULT_PORT: u16 = 8080;

/// Point-in-time liveness and connection-count snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    /// Whether the sync server is accepting connections.
    pub is_running: bool,
    /// Number of connected devices.
    pub client_count: usize,
}

impl ServerStatus {
    /// Status of a server that is not running.
    pub const fn stopped() -> Self {
        Self {
            is_running: false,
            client_count: 0,
        }
    }

    /// Status of a running server with `client_count` connected devices.
    pub const fn running(client_count: usize) -> Self {
        Self {
            is_running: true,
            client_count,
        }
    }
}

/// Network binding configuration for the sync server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface address to bind (e.g. `"0.0.0.0"`).
    pub address: String,
    /// TCP port (0 lets the OS pick one).
    pub port: u16,
}

impl ServerConfig {
    /// Create a config for `address:port`.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// The `address:port` string handed to the listener.
    ///
    /// IPv6 literals are bracketed so the result parses as a socket address.
    pub fn bind_addr(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS, DEFAULT_PORT)
    }
}
