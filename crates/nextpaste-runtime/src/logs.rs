//! Operator-visible activity log.
//!
//! Newest entry first, capped at `max_logs`. Every change is pushed to the
//! event emitter as the whole list so the UI can just replace its copy.

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use nextpaste_core::settings::DEFAULT_MAX_LOGS;
use nextpaste_core::{AppEvent, AppEventEmitter, LogEntry, LogLevel, LogSinkPort};

/// Bounded, newest-first activity log.
pub struct ActivityLog {
    entries: RwLock<VecDeque<LogEntry>>,
    max_logs: usize,
    events: Arc<dyn AppEventEmitter>,
}

impl ActivityLog {
    pub fn new(max_logs: usize, events: Arc<dyn AppEventEmitter>) -> Self {
        let max_logs = max_logs.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(max_logs.min(DEFAULT_MAX_LOGS))),
            max_logs,
            events,
        }
    }

    /// Copy of all entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn max_logs(&self) -> usize {
        self.max_logs
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.events.emit(AppEvent::logs_updated(Vec::new()));
    }
}

impl LogSinkPort for ActivityLog {
    fn record(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::Error => tracing::error!(target: "nextpaste::activity", "{message}"),
            LogLevel::Warning => tracing::warn!(target: "nextpaste::activity", "{message}"),
            LogLevel::Info | LogLevel::Success => {
                tracing::info!(target: "nextpaste::activity", level = %level, "{message}");
            }
        }

        let snapshot = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entries.push_front(LogEntry::new(level, message));
            entries.truncate(self.max_logs);
            entries.iter().cloned().collect()
        };
        self.events.emit(AppEvent::logs_updated(snapshot));
    }
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("len", &self.len())
            .field("max_logs", &self.max_logs)
            .finish_non_exhaustive()
    }
}
