//! `nextpaste serve`: the sync server without the control API.

use std::net::SocketAddr;
use std::sync::Arc;

use nextpaste_core::{NoopEmitter, ServerConfig, Settings};
use nextpaste_runtime::{ServiceOptions, SyncService, system_backend};

use crate::bootstrap::{CliContext, shutdown_signal};
use crate::error::CliError;

/// Flags override the saved settings.
pub fn server_config(settings: &Settings, address: Option<String>, port: Option<u16>) -> ServerConfig {
    let defaults = settings.server_config();
    ServerConfig::new(
        address.unwrap_or(defaults.address),
        port.unwrap_or(defaults.port),
    )
}

pub async fn execute(
    ctx: &CliContext,
    address: Option<String>,
    port: Option<u16>,
) -> Result<(), CliError> {
    let config = server_config(&ctx.settings, address, port);
    let service = SyncService::new(
        system_backend(),
        Arc::new(NoopEmitter::new()),
        ServiceOptions::from_settings(&ctx.settings),
    );

    let addr = service.start_server(&config).await?;
    print_connect_urls(addr, &service.local_ips());
    println!("  Press Ctrl+C to stop");
    println!();

    shutdown_signal().await;
    service.shutdown().await;
    Ok(())
}

/// The URLs other devices should use.
pub fn connect_urls(addr: SocketAddr, local_ips: &[String]) -> Vec<String> {
    if addr.ip().is_unspecified() && !local_ips.is_empty() {
        local_ips
            .iter()
            .map(|ip| format!("ws://{ip}:{}/ws", addr.port()))
            .collect()
    } else {
        vec![format!("ws://{addr}/ws")]
    }
}

fn print_connect_urls(addr: SocketAddr, local_ips: &[String]) {
    println!();
    println!("  NextPaste sync server listening on {addr}");
    println!();
    println!("  Connect other devices to:");
    for url in connect_urls(addr, local_ips) {
        println!("    {url}");
    }
    println!();
}
