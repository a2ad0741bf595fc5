//! Activity log records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity of an activity log line.
///
/// Rendered upper-case on the wire (`"INFO"`, `"SUCCESS"`, ...) because the
/// UI colours rows by matching these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Wire representation of the level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "SUCCESS" => Ok(Self::Success),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// A single timestamped, leveled log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Severity, e.g. `"INFO"`.
    pub level: String,
    /// Human-readable message.
    pub message: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

impl LogEntry {
    /// Create an entry stamped with the current wall-clock time.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level: level.as_str().to_string(),
            message: message.into(),
            timestamp: now_millis(),
        }
    }

    /// Parsed severity, if the level string is one of the known values.
    pub fn log_level(&self) -> Option<LogLevel> {
        self.level.parse().ok()
    }
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
