//! Settings subcommands.

use clap::{Args, Subcommand};

/// `nextpaste config` subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the saved settings and their effective values
    Show,
    /// Update settings (only the given flags change)
    Set(SetArgs),
    /// Reset every setting to its default
    Reset,
    /// Print the settings file location
    Path,
}

/// Flags for `nextpaste config set`.
#[derive(Debug, Default, Args)]
pub struct SetArgs {
    /// Interface the sync server binds to
    #[arg(long)]
    pub address: Option<String>,
    /// Port the sync server binds to (0 lets the OS pick)
    #[arg(long)]
    pub port: Option<u16>,
    /// Activity log lines to keep (1-10000)
    #[arg(long)]
    pub max_logs: Option<usize>,
    /// Image chunk size in bytes (>= 1024)
    #[arg(long)]
    pub chunk_size: Option<usize>,
    /// Heartbeat interval in seconds (1-3600)
    #[arg(long)]
    pub heartbeat_interval: Option<u64>,
    /// Client reconnect delay in seconds (1-3600)
    #[arg(long)]
    pub reconnect_interval: Option<u64>,
    /// Clipboard poll interval in milliseconds (50-60000)
    #[arg(long)]
    pub poll_interval: Option<u64>,
    /// Name announced to other devices
    #[arg(long)]
    pub device_name: Option<String>,
}
