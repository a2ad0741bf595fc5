//! CLI-specific error types and mappings.
//!
//! Maps domain errors to exit codes and user-facing messages.

use nextpaste_core::{ClipboardError, CoreError, PathError, ServerError};
use nextpaste_runtime::ClientError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A server could not start (port in use, bad address).
    #[error("{0}")]
    Unavailable(String),

    /// Could not reach the remote server.
    #[error("Connection error: {0}")]
    Connection(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Specific error categories
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2,   // EX_USAGE
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Connection(_) => 68, // EX_NOHOST
            Self::Io(_) => 74,         // EX_IOERR
            Self::Config(_) => 78,     // EX_CONFIG
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Server(server_err) => server_err.into(),
            CoreError::Clipboard(clip_err) => clip_err.into(),
            CoreError::Settings(settings_err) => Self::Config(settings_err.to_string()),
            CoreError::Validation(msg) => Self::Arguments(msg),
            CoreError::Configuration(msg) => Self::Config(msg),
            CoreError::Internal(msg) => Self::Core(msg),
        }
    }
}

impl From<ServerError> for CliError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::BindFailed { .. } => Self::Unavailable(err.to_string()),
            _ => Self::Core(err.to_string()),
        }
    }
}

impl From<ClipboardError> for CliError {
    fn from(err: ClipboardError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Connect(msg) => Self::Connection(msg),
            _ => Self::Core(err.to_string()),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return Self::Io(io.to_string());
        }
        Self::Core(format!("{err:#}"))
    }
}
