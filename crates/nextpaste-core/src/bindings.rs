//! Frontend binding records.
//!
//! The UI receives loosely-typed JSON from the backend and turns it into the
//! record shapes below. Construction copies fields one by one: a missing
//! field stays absent (`None`), nothing is defaulted or coerced. A string
//! source is parsed as JSON first and must be well-formed.
//!
//! ```
//! use nextpaste_core::bindings::LogEntry;
//!
//! let entry = LogEntry::create_from(r#"{"level":"info","message":"started","timestamp":1000}"#)
//!     .unwrap();
//! assert_eq!(entry.level.as_deref(), Some("info"));
//! assert_eq!(entry.timestamp, Some(1000));
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain;

/// Errors from building a binding record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The string source is not well-formed JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// A field is present but holds a value of the wrong JSON type.
    #[error("Invalid field: {0}")]
    Field(#[source] serde_json::Error),

    /// A field required by the strict record is absent.
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

/// Untyped input for `create_from`: an already-decoded JSON value, or
/// serialized JSON text.
#[derive(Debug, Clone)]
pub enum RecordSource {
    Value(Value),
    Text(String),
}

impl From<Value> for RecordSource {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&Value> for RecordSource {
    fn from(value: &Value) -> Self {
        Self::Value(value.clone())
    }
}

impl From<String> for RecordSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RecordSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Decode a binding record from a source.
///
/// Non-object sources have no fields to copy, so every field is absent.
fn decode<T>(source: RecordSource) -> Result<T, RecordError>
where
    T: DeserializeOwned + Default,
{
    let value = match source {
        RecordSource::Value(value) => value,
        RecordSource::Text(text) => serde_json::from_str(&text).map_err(RecordError::Parse)?,
    };

    if !value.is_object() {
        return Ok(T::default());
    }

    serde_json::from_value(value).map_err(RecordError::Field)
}

fn require<T>(field: Option<T>, name: &'static str) -> Result<T, RecordError> {
    field.ok_or(RecordError::MissingField(name))
}

/// Binding shape of [`domain::LogEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl LogEntry {
    /// Build from a JSON value or JSON text.
    pub fn create_from(source: impl Into<RecordSource>) -> Result<Self, RecordError> {
        decode(source.into())
    }

    /// Convert into the strict record, failing on the first absent field.
    pub fn into_record(self) -> Result<domain::LogEntry, RecordError> {
        Ok(domain::LogEntry {
            level: require(self.level, "level")?,
            message: require(self.message, "message")?,
            timestamp: require(self.timestamp, "timestamp")?,
        })
    }
}

impl From<domain::LogEntry> for LogEntry {
    fn from(entry: domain::LogEntry) -> Self {
        Self {
            level: Some(entry.level),
            message: Some(entry.message),
            timestamp: Some(entry.timestamp),
        }
    }
}

/// Binding shape of [`domain::ServerStatus`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_count: Option<usize>,
}

impl ServerStatus {
    pub fn create_from(source: impl Into<RecordSource>) -> Result<Self, RecordError> {
        decode(source.into())
    }

    pub fn into_record(self) -> Result<domain::ServerStatus, RecordError> {
        Ok(domain::ServerStatus {
            is_running: require(self.is_running, "isRunning")?,
            client_count: require(self.client_count, "clientCount")?,
        })
    }
}

impl From<domain::ServerStatus> for ServerStatus {
    fn from(status: domain::ServerStatus) -> Self {
        Self {
            is_running: Some(status.is_running),
            client_count: Some(status.client_count),
        }
    }
}

/// Binding shape of [`domain::ServerConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl ServerConfig {
    pub fn create_from(source: impl Into<RecordSource>) -> Result<Self, RecordError> {
        decode(source.into())
    }

    pub fn into_record(self) -> Result<domain::ServerConfig, RecordError> {
        Ok(domain::ServerConfig {
            address: require(self.address, "address")?,
            port: require(self.port, "port")?,
        })
    }
}

impl From<domain::ServerConfig> for ServerConfig {
    fn from(config: domain::ServerConfig) -> Self {
        Self {
            address: Some(config.address),
            port: Some(config.port),
        }
    }
}
