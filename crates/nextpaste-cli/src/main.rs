//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use nextpaste_cli::handlers;
use nextpaste_cli::handlers::web::WebArgs;
use nextpaste_cli::{Cli, CliConfig, CliError, Commands, bootstrap, init_tracing, load_env};

#[tokio::main]
async fn main() -> ExitCode {
    load_env();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(CliConfig::with_defaults()?)?;

    match command {
        Commands::Web {
            host,
            port,
            api_only,
            static_dir,
            cors_origin,
            autostart,
        } => {
            let args = WebArgs {
                host,
                port,
                api_only,
                static_dir,
                cors_origins: cors_origin,
                autostart,
            };
            handlers::web::execute(&ctx, args).await
        }
        Commands::Serve { address, port } => handlers::serve::execute(&ctx, address, port).await,
        Commands::Relay { host, port } => handlers::relay::execute(&host, port).await,
        Commands::Connect { url, device_name } => {
            handlers::connect::execute(&ctx, &url, device_name).await
        }
        Commands::Ips => {
            handlers::ips::execute();
            Ok(())
        }
        Commands::Config { command } => handlers::config::execute(&ctx, command),
    }
}
