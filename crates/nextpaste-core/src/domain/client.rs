//! Connected device records.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A device connected to the sync server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Connection id assigned by the server.
    pub id: String,
    /// Name announced in the handshake (empty until then).
    pub device_name: String,
    /// Operating system announced in the handshake.
    pub platform: String,
    /// Connection time, `YYYY-MM-DD HH:MM:SS` local time.
    pub connected_at: String,
}

impl ClientInfo {
    /// A freshly connected client that has not sent its handshake yet.
    pub fn connected(id: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            id: id.into(),
            device_name: String::new(),
            platform: String::new(),
            connected_at: at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Name to show in log lines: the device name, or the id before handshake.
    pub fn display_name(&self) -> &str {
        if self.device_name.is_empty() {
            &self.id
        } else {
            &self.device_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_connected_formats_time() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let info = ClientInfo::connected("abc", at);
        assert_eq!(info.connected_at, "2024-03-09 07:05:01");
        assert_eq!(info.display_name(), "abc");
    }

    #[test]
    fn test_wire_names() {
        let mut info = ClientInfo::connected("abc", Local::now());
        info.device_name = "Pixel".into();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["deviceName"], "Pixel");
        assert!(json.get("connectedAt").is_some());
        assert_eq!(info.display_name(), "Pixel");
    }
}
