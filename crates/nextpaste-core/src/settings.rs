//! Settings domain types and validation.
//!
//! Pure data; reading and writing the settings file lives in `paths`.

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_ADDRESS, DEFAULT_PORT, ServerConfig};

/// Default number of retained activity log lines.
pub const DEFAULT_MAX_LOGS: usize = 500;

/// Default chunk size for image transfers.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Smallest accepted chunk size.
pub const MIN_CHUNK_SIZE: usize = 1024;

/// Default heartbeat / ping interval.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Default client reconnect delay.
pub const DEFAULT_RECONNECT_INTERVAL_SECS: u64 = 5;

/// Default clipboard poll interval.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Application settings.
///
/// All fields are optional so that a partially written file still loads and
/// defaults can change between releases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Address the sync server binds to.
    pub address: Option<String>,

    /// Port the sync server binds to (0 lets the OS pick).
    pub port: Option<u16>,

    /// Maximum retained activity log lines (1-10000).
    pub max_logs: Option<usize>,

    /// Image chunk size in bytes (>= 1024).
    pub chunk_size: Option<usize>,

    /// Heartbeat and ping interval in seconds.
    pub heartbeat_interval_secs: Option<u64>,

    /// Client reconnect delay in seconds.
    pub reconnect_interval_secs: Option<u64>,

    /// Clipboard poll interval in milliseconds.
    pub poll_interval_ms: Option<u64>,

    /// Name announced in handshakes. Falls back to the host name.
    pub device_name: Option<String>,
}

impl Settings {
    /// Create settings with every default filled in.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            address: Some(DEFAULT_ADDRESS.to_string()),
            port: Some(DEFAULT_PORT),
            max_logs: Some(DEFAULT_MAX_LOGS),
            chunk_size: Some(DEFAULT_CHUNK_SIZE),
            heartbeat_interval_secs: Some(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            reconnect_interval_secs: Some(DEFAULT_RECONNECT_INTERVAL_SECS),
            poll_interval_ms: Some(DEFAULT_POLL_INTERVAL_MS),
            device_name: None,
        }
    }

    pub fn effective_address(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_ADDRESS)
    }

    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        match self.port {
            Some(port) => port,
            None => DEFAULT_PORT,
        }
    }

    #[must_use]
    pub const fn effective_max_logs(&self) -> usize {
        match self.max_logs {
            Some(n) => n,
            None => DEFAULT_MAX_LOGS,
        }
    }

    #[must_use]
    pub const fn effective_chunk_size(&self) -> usize {
        match self.chunk_size {
            Some(n) => n,
            None => DEFAULT_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub const fn effective_heartbeat_interval_secs(&self) -> u64 {
        match self.heartbeat_interval_secs {
            Some(n) => n,
            None => DEFAULT_HEARTBEAT_INTERVAL_SECS,
        }
    }

    #[must_use]
    pub const fn effective_reconnect_interval_secs(&self) -> u64 {
        match self.reconnect_interval_secs {
            Some(n) => n,
            None => DEFAULT_RECONNECT_INTERVAL_SECS,
        }
    }

    #[must_use]
    pub const fn effective_poll_interval_ms(&self) -> u64 {
        match self.poll_interval_ms {
            Some(n) => n,
            None => DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Device name, or `fallback` (usually the host name) when unset.
    pub fn effective_device_name(&self, fallback: impl FnOnce() -> String) -> String {
        self.device_name.clone().unwrap_or_else(fallback)
    }

    /// Server bind configuration derived from these settings.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.effective_address(), self.effective_port())
    }

    /// Merge an update into this one, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref address) = other.address {
            self.address.clone_from(address);
        }
        if let Some(port) = other.port {
            self.port = port;
        }
        if let Some(max_logs) = other.max_logs {
            self.max_logs = max_logs;
        }
        if let Some(chunk_size) = other.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(secs) = other.heartbeat_interval_secs {
            self.heartbeat_interval_secs = secs;
        }
        if let Some(secs) = other.reconnect_interval_secs {
            self.reconnect_interval_secs = secs;
        }
        if let Some(ms) = other.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if let Some(ref name) = other.device_name {
            self.device_name.clone_from(name);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset the field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub port: Option<Option<u16>>,
    #[serde(default, with = "double_option")]
    pub max_logs: Option<Option<usize>>,
    #[serde(default, with = "double_option")]
    pub chunk_size: Option<Option<usize>>,
    #[serde(default, with = "double_option")]
    pub heartbeat_interval_secs: Option<Option<u64>>,
    #[serde(default, with = "double_option")]
    pub reconnect_interval_secs: Option<Option<u64>>,
    #[serde(default, with = "double_option")]
    pub poll_interval_ms: Option<Option<u64>>,
    #[serde(default, with = "double_option")]
    pub device_name: Option<Option<String>>,
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Address cannot be empty")]
    EmptyAddress,

    #[error("Max logs must be between 1 and 10,000, got {0}")]
    InvalidMaxLogs(usize),

    #[error("Chunk size must be at least {MIN_CHUNK_SIZE} bytes, got {0}")]
    InvalidChunkSize(usize),

    #[error("{field} must be between 1 and 3600 seconds, got {value}")]
    InvalidInterval { field: &'static str, value: u64 },

    #[error("Poll interval must be between 50 and 60,000 ms, got {0}")]
    InvalidPollInterval(u64),

    #[error("Device name cannot be empty")]
    EmptyDeviceName,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings
        .address
        .as_ref()
        .is_some_and(|a| a.trim().is_empty())
    {
        return Err(SettingsError::EmptyAddress);
    }

    if let Some(max_logs) = settings.max_logs {
        if !(1..=10_000).contains(&max_logs) {
            return Err(SettingsError::InvalidMaxLogs(max_logs));
        }
    }

    if let Some(chunk_size) = settings.chunk_size {
        if chunk_size < MIN_CHUNK_SIZE {
            return Err(SettingsError::InvalidChunkSize(chunk_size));
        }
    }

    for (field, value) in [
        ("Heartbeat interval", settings.heartbeat_interval_secs),
        ("Reconnect interval", settings.reconnect_interval_secs),
    ] {
        if let Some(value) = value {
            if !(1..=3600).contains(&value) {
                return Err(SettingsError::InvalidInterval { field, value });
            }
        }
    }

    if let Some(ms) = settings.poll_interval_ms {
        if !(50..=60_000).contains(&ms) {
            return Err(SettingsError::InvalidPollInterval(ms));
        }
    }

    if settings
        .device_name
        .as_ref()
        .is_some_and(|n| n.trim().is_empty())
    {
        return Err(SettingsError::EmptyDeviceName);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.port, Some(8080));
        assert_eq!(settings.max_logs, Some(500));
        assert_eq!(settings.chunk_size, Some(65536));
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_effective_values_fall_back() {
        let settings = Settings::default();
        assert_eq!(settings.effective_address(), "0.0.0.0");
        assert_eq!(settings.effective_port(), 8080);
        assert_eq!(settings.effective_poll_interval_ms(), 500);
        assert_eq!(settings.effective_device_name(|| "host".into()), "host");
    }

    #[test]
    fn test_server_config_from_settings() {
        let settings = Settings {
            address: Some("127.0.0.1".into()),
            port: Some(0),
            ..Default::default()
        };
        assert_eq!(settings.server_config(), ServerConfig::new("127.0.0.1", 0));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut settings = Settings {
            max_logs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidMaxLogs(0))
        ));

        settings.max_logs = None;
        settings.chunk_size = Some(512);
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidChunkSize(512))
        ));

        settings.chunk_size = None;
        settings.reconnect_interval_secs = Some(0);
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidInterval { value: 0, .. })
        ));

        settings.reconnect_interval_secs = None;
        settings.poll_interval_ms = Some(10);
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPollInterval(10))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_strings() {
        let settings = Settings {
            address: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::EmptyAddress)
        ));

        let settings = Settings {
            device_name: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::EmptyDeviceName)
        ));
    }

    #[test]
    fn test_merge_settings() {
        let mut settings = Settings::with_defaults();
        let update = SettingsUpdate {
            port: Some(Some(9999)),
            device_name: Some(Some("laptop".into())),
            max_logs: Some(None),
            ..Default::default()
        };
        settings.merge(&update);

        assert_eq!(settings.port, Some(9999));
        assert_eq!(settings.device_name.as_deref(), Some("laptop"));
        assert_eq!(settings.max_logs, None);
        assert_eq!(settings.chunk_size, Some(65536));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let update: SettingsUpdate =
            serde_json::from_str(r#"{"port": 9000, "deviceName": null}"#).unwrap();
        assert_eq!(update.port, Some(Some(9000)));
        assert_eq!(update.device_name, Some(None));
        assert_eq!(update.address, None);
    }

    #[test]
    fn test_settings_json_is_camel_case() {
        let settings = Settings {
            max_logs: Some(10),
            ..Default::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["maxLogs"], 10);

        let parsed: Settings = serde_json::from_str(r#"{"pollIntervalMs": 250}"#).unwrap();
        assert_eq!(parsed.poll_interval_ms, Some(250));
        assert_eq!(parsed.port, None);
    }
}
