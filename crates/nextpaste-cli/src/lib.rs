//! The `nextpaste` command-line interface.
//!
//! `main.rs` is the composition root; this library holds the argument
//! definitions, error mapping and one handler per subcommand so they can
//! be tested without spawning the binary.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

pub mod bootstrap;
pub mod commands;
pub mod config_commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap, init_tracing, load_env, shutdown_signal};
pub use commands::Commands;
pub use config_commands::{ConfigCommand, SetArgs};
pub use error::CliError;
pub use parser::Cli;
