//! Path utilities for NextPaste data directories.
//!
//! - Data root (settings file, `.env` overrides)
//! - Settings persistence
//!
//! No interactive/terminal I/O here; adapters handle prompts separately.

mod config;
mod error;
mod platform;

#[cfg(test)]
mod test_utils;

pub use error::PathError;

pub use platform::{DATA_DIR_ENV, data_root};

pub use config::{
    env_file_path, load_settings, load_settings_from, save_settings, save_settings_to,
    settings_path,
};
