//! Subcommand definitions.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config_commands::ConfigCommand;

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the control API and web UI
    Web {
        /// Interface to bind the control API to
        #[arg(long, default_value = "127.0.0.1", env = "NEXTPASTE_WEB_HOST")]
        host: String,
        /// Port to serve the control API on
        #[arg(short, long, default_value = "9887", env = "NEXTPASTE_WEB_PORT")]
        port: u16,
        /// Serve API endpoints only (do not serve static UI assets)
        ///
        /// By default a built frontend (e.g. `./frontend/dist`) is detected
        /// and served with SPA fallback. Use this flag when running the UI
        /// dev server separately.
        #[arg(long)]
        api_only: bool,
        /// Directory containing built frontend assets
        #[arg(long, env = "NEXTPASTE_STATIC_DIR")]
        static_dir: Option<PathBuf>,
        /// Allowed CORS origins (comma separated). All origins when omitted.
        #[arg(long, value_delimiter = ',', env = "NEXTPASTE_CORS_ORIGINS")]
        cors_origin: Vec<String>,
        /// Start the sync server from saved settings right away
        #[arg(long, env = "NEXTPASTE_AUTOSTART")]
        autostart: bool,
    },

    /// Run the sync server headless until Ctrl+C
    Serve {
        /// Interface to bind (defaults to the saved setting)
        #[arg(short, long, env = "NEXTPASTE_ADDRESS")]
        address: Option<String>,
        /// Port to bind (defaults to the saved setting)
        #[arg(short, long, env = "NEXTPASTE_PORT")]
        port: Option<u16>,
    },

    /// Run a room relay for devices on different networks
    Relay {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0", env = "NEXTPASTE_RELAY_HOST")]
        host: String,
        /// Port to bind to
        #[arg(short, long, default_value = "8080", env = "NEXTPASTE_RELAY_PORT")]
        port: u16,
    },

    /// Connect this device to a sync server or relay room
    Connect {
        /// Server URL, e.g. `ws://192.168.1.20:8080/ws` or `ws://relay:8080/ws/my-room`
        #[arg(env = "NEXTPASTE_SERVER_URL")]
        url: String,
        /// Name announced to other devices (defaults to the saved setting or host name)
        #[arg(long, env = "NEXTPASTE_DEVICE_NAME")]
        device_name: Option<String>,
    },

    /// List this host's addresses other devices can connect to
    Ips,

    /// View or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[cfg(test)]
mod tests {
    use crate::parser::Cli;
    use crate::{Commands, ConfigCommand};
    use clap::Parser;

    #[test]
    fn test_web_flags() {
        let cli = Cli::parse_from([
            "nextpaste",
            "web",
            "--port",
            "9000",
            "--autostart",
            "--cors-origin",
            "http://a.test,http://b.test",
        ]);
        let Some(Commands::Web {
            port,
            autostart,
            cors_origin,
            api_only,
            ..
        }) = cli.command
        else {
            panic!("expected web command");
        };
        assert_eq!(port, 9000);
        assert!(autostart);
        assert!(!api_only);
        assert_eq!(cors_origin, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_relay_defaults() {
        let cli = Cli::parse_from(["nextpaste", "relay"]);
        let Some(Commands::Relay { host, port }) = cli.command else {
            panic!("expected relay command");
        };
        assert_eq!(host, "0.0.0.0");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_connect_url() {
        let cli = Cli::parse_from([
            "nextpaste",
            "connect",
            "ws://10.0.0.2:8080/ws",
            "--device-name",
            "laptop",
        ]);
        let Some(Commands::Connect { url, device_name }) = cli.command else {
            panic!("expected connect command");
        };
        assert_eq!(url, "ws://10.0.0.2:8080/ws");
        assert_eq!(device_name.as_deref(), Some("laptop"));
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::parse_from([
            "nextpaste",
            "config",
            "set",
            "--port",
            "9100",
            "--device-name",
            "desk",
        ]);
        let Some(Commands::Config {
            command: ConfigCommand::Set(args),
        }) = cli.command
        else {
            panic!("expected config set");
        };
        assert_eq!(args.port, Some(9100));
        assert_eq!(args.device_name.as_deref(), Some("desk"));
        assert!(args.max_logs.is_none());
    }
}
