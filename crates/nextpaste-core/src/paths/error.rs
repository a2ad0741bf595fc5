//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during path resolution and settings persistence.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// Failed to read or write the settings file.
    #[error("Failed to access settings file {path}: {reason}")]
    SettingsFile { path: PathBuf, reason: String },

    /// The settings file exists but is not valid JSON.
    #[error("Invalid settings file {path}: {reason}")]
    InvalidSettings { path: PathBuf, reason: String },
}
