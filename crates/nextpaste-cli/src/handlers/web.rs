//! `nextpaste web`: control API plus the web UI.

use std::path::{Path, PathBuf};

use nextpaste_axum::{CorsConfig, WebConfig, start_server};

use crate::bootstrap::{CliContext, shutdown_signal};
use crate::error::CliError;

/// Frontend build locations tried in order when `--static-dir` is absent.
const STATIC_DIR_CANDIDATES: [&str; 3] = ["./frontend/dist", "./dist", "./web_ui/dist"];

/// Arguments of the `web` subcommand.
#[derive(Debug, Clone, Default)]
pub struct WebArgs {
    pub host: String,
    pub port: u16,
    pub api_only: bool,
    pub static_dir: Option<PathBuf>,
    pub cors_origins: Vec<String>,
    pub autostart: bool,
}

/// Static directory to serve: none with `api_only`, else the explicit one,
/// else the first candidate under `root` that has an `index.html`.
pub fn resolve_static_dir(root: &Path, api_only: bool, explicit: Option<PathBuf>) -> Option<PathBuf> {
    if api_only {
        return None;
    }
    explicit.or_else(|| {
        STATIC_DIR_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.join("index.html").exists())
    })
}

pub fn web_config(ctx: &CliContext, args: WebArgs) -> WebConfig {
    let cors = if args.cors_origins.is_empty() {
        CorsConfig::AllowAll
    } else {
        CorsConfig::AllowOrigins(args.cors_origins)
    };
    WebConfig {
        host: args.host,
        port: args.port,
        static_dir: resolve_static_dir(Path::new("."), args.api_only, args.static_dir),
        cors,
        settings_path: ctx.settings_path.clone(),
        autostart: args.autostart,
    }
}

pub async fn execute(ctx: &CliContext, args: WebArgs) -> Result<(), CliError> {
    let config = web_config(ctx, args);

    println!();
    match config.static_dir {
        Some(ref dir) => {
            println!("  NextPaste web server starting...");
            println!("  Serving UI from: {}", dir.display());
        }
        None => println!("  NextPaste web server starting (API only)..."),
    }
    println!("  Control API: http://{}:{}/api", config.host, config.port);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    start_server(config, shutdown_signal()).await?;
    Ok(())
}
