//! Log sink port for operator-visible activity lines.
//!
//! The sync server, client and clipboard monitor report what they do through
//! this port. The desktop/web host stores the lines for the UI; headless
//! contexts just trace them.

use crate::domain::LogLevel;

/// Port for appending activity log lines.
///
/// Implementations must be thread-safe and must not block.
pub trait LogSinkPort: Send + Sync {
    /// Record a line at the given level.
    fn record(&self, level: LogLevel, message: String);

    fn info(&self, message: String) {
        self.record(LogLevel::Info, message);
    }

    fn success(&self, message: String) {
        self.record(LogLevel::Success, message);
    }

    fn warning(&self, message: String) {
        self.record(LogLevel::Warning, message);
    }

    fn error(&self, message: String) {
        self.record(LogLevel::Error, message);
    }
}

/// Log sink that forwards lines to `tracing` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl LogSinkPort for NoopLogSink {
    fn record(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::Error => tracing::error!("{message}"),
            LogLevel::Warning => tracing::warn!("{message}"),
            LogLevel::Info | LogLevel::Success => tracing::info!("{message}"),
        }
    }
}
