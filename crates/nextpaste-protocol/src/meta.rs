//! JSON metadata carried inside frames.

use serde::{Deserialize, Serialize};

/// Protocol version announced in handshakes (V1.1).
pub const HANDSHAKE_VERSION: u32 = 11;

/// Handshake payload: who is on the other end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeMeta {
    pub name: String,
    pub os: String,
    #[serde(default)]
    pub ver: u32,
}

impl HandshakeMeta {
    pub fn new(name: impl Into<String>, os: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            os: os.into(),
            ver: HANDSHAKE_VERSION,
        }
    }

    /// Minor version for display (`11` → `1`).
    pub const fn minor_version(&self) -> u32 {
        self.ver % 10
    }
}

/// Metadata for the first frame of an image or file transfer.
///
/// Absent fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl TransferMeta {
    /// Metadata for an image of `size` bytes.
    pub fn image(mime: impl Into<String>, size: usize) -> Self {
        Self {
            mime: Some(mime.into()),
            size: Some(size as u64),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_meta_omits_absent_fields() {
        let meta = TransferMeta::image("image/png", 42);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"mime":"image/png","size":42}"#);
    }

    #[test]
    fn test_handshake_meta_wire_shape() {
        let meta = HandshakeMeta::new("desk", "linux");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "desk", "os": "linux", "ver": 11})
        );
        assert_eq!(meta.minor_version(), 1);
    }
}
