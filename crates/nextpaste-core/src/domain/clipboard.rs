//! Clipboard payload types.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// MIME type used for clipboard text.
pub const DEFAULT_TEXT_MIME: &str = "text/plain";

/// MIME type assumed for clipboard images when none is given.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Kind of clipboard content that is synchronised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardKind {
    Text,
    Image,
}

impl ClipboardKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    /// MIME type used when the producer does not name one.
    pub const fn default_mime(self) -> &'static str {
        match self {
            Self::Text => DEFAULT_TEXT_MIME,
            Self::Image => DEFAULT_IMAGE_MIME,
        }
    }
}

impl fmt::Display for ClipboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClipboardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            other => Err(format!("unsupported data type: {other}")),
        }
    }
}

/// Clipboard content moving between the local clipboard and the network.
///
/// Text is carried as UTF-8 bytes; images as encoded bytes (PNG unless the
/// MIME type says otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardContent {
    pub kind: ClipboardKind,
    pub mime_type: String,
    pub data: Bytes,
}

impl ClipboardContent {
    /// Text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ClipboardKind::Text,
            mime_type: DEFAULT_TEXT_MIME.to_string(),
            data: Bytes::from(text.into()),
        }
    }

    /// Image content with an explicit MIME type.
    pub fn image(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            kind: ClipboardKind::Image,
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// PNG image content.
    pub fn png(data: impl Into<Bytes>) -> Self {
        Self::image(data, DEFAULT_IMAGE_MIME)
    }

    /// Text view of the data (lossy for non-UTF-8 bytes).
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Number of characters for text, bytes otherwise.
    pub fn len(&self) -> usize {
        match self.kind {
            ClipboardKind::Text => self.as_text().chars().count(),
            ClipboardKind::Image => self.data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size in mebibytes, for log lines.
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mb(&self) -> f64 {
        self.data.len() as f64 / 1024.0 / 1024.0
    }
}
