//! V1.0 JSON envelope.
//!
//! Older clients and some relays still exchange these as WebSocket text
//! messages. The sync server speaks V1.1 only; this module lets it recognise
//! old messages and lets the client accept old-style base64 payloads.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use nextpaste_core::ClipboardContent;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProtocolError;

/// Message action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncAction {
    Handshake,
    ClipboardSync,
    Heartbeat,
}

/// Clipboard data type in a legacy payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyDataType {
    Text,
    Image,
    Html,
}

/// The envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    pub action: SyncAction,
    pub id: String,
    pub timestamp: i64,
    pub sender_id: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakePayload {
    pub device_name: String,
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardPayload {
    #[serde(rename = "type")]
    pub data_type: LegacyDataType,
    pub mime_type: String,
    /// Text, or base64 for images.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,
}

impl SyncMessage {
    /// New envelope with a random id and the current time in milliseconds.
    pub fn new(
        action: SyncAction,
        sender_id: impl Into<String>,
        payload: &impl Serialize,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            action,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            sender_id: sender_id.into(),
            data: serde_json::to_value(payload).map_err(ProtocolError::Encode)?,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::Legacy)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Decode `data` as a specific payload type.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        T::deserialize(&self.data).map_err(ProtocolError::Legacy)
    }
}

impl ClipboardPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            data_type: LegacyDataType::Text,
            mime_type: nextpaste_core::DEFAULT_TEXT_MIME.to_string(),
            content: text.into(),
            preview: None,
        }
    }

    /// Image payload, base64-encoding `data`.
    pub fn image(data: &[u8], mime: impl Into<String>) -> Self {
        Self {
            data_type: LegacyDataType::Image,
            mime_type: mime.into(),
            content: BASE64.encode(data),
            preview: None,
        }
    }

    /// Convert into clipboard content, decoding base64 images.
    ///
    /// HTML payloads are not synchronised.
    pub fn into_content(self) -> Result<ClipboardContent, ProtocolError> {
        match self.data_type {
            LegacyDataType::Text => Ok(ClipboardContent::text(self.content)),
            LegacyDataType::Image => {
                let data = BASE64
                    .decode(self.content.as_bytes())
                    .map_err(ProtocolError::Base64)?;
                let mime = if self.mime_type.is_empty() {
                    nextpaste_core::DEFAULT_IMAGE_MIME.to_string()
                } else {
                    self.mime_type
                };
                Ok(ClipboardContent::image(data, mime))
            }
            LegacyDataType::Html => Err(ProtocolError::InvalidInput(
                "html clipboard content is not synchronised",
            )),
        }
    }
}
