//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Clipboard sync between your devices over the local network.
#[derive(Debug, Parser)]
#[command(name = "nextpaste")]
#[command(about = "Sync the clipboard between devices over WebSocket")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true, env = "NEXTPASTE_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
