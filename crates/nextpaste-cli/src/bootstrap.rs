//! CLI bootstrap: logging, environment and the loaded settings.
//!
//! Subcommands that run services compose them in their handlers from the
//! settings held by [`CliContext`].

use std::path::PathBuf;

use nextpaste_core::{Settings, env_file_path, load_settings_from, settings_path};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Settings file to read and write.
    pub settings_path: PathBuf,
}

impl CliConfig {
    /// Use the settings file under the data root.
    pub fn with_defaults() -> Result<Self, CliError> {
        Ok(Self {
            settings_path: settings_path()?,
        })
    }
}

/// Settings and their location, shared by every handler.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub settings: Settings,
    pub settings_path: PathBuf,
}

/// Load the settings file (defaults when missing).
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let settings = load_settings_from(&config.settings_path)?;
    Ok(CliContext {
        settings,
        settings_path: config.settings_path,
    })
}

/// Load `.env` from the working directory, then the one under the data root.
///
/// Variables already set in the environment win.
pub fn load_env() {
    dotenvy::dotenv().ok();
    if let Ok(path) = env_file_path() {
        dotenvy::from_path(path).ok();
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the default level (`info`, or `debug` with
/// `--verbose`).
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .init();
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
