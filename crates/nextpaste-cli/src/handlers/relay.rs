//! `nextpaste relay`: room relay for devices on different networks.

use nextpaste_relay::{RelayServer, RelayTiming, serve};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::bootstrap::shutdown_signal;
use crate::error::CliError;

pub async fn execute(host: &str, port: u16) -> Result<(), CliError> {
    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|e| CliError::Unavailable(format!("Failed to bind relay to {host}:{port}: {e}")))?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });

    serve(listener, RelayServer::new(RelayTiming::default()), cancel).await?;
    Ok(())
}
