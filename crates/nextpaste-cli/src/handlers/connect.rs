//! `nextpaste connect`: mirror the local clipboard with a remote server.
//!
//! Content received from the server is written to the local clipboard
//! through the monitor, so it is not sent back. Local changes are sent to
//! the server while connected.

use std::sync::Arc;
use std::time::Duration;

use nextpaste_core::{ClipboardContent, LogSinkPort, NoopEmitter, Settings};
use nextpaste_runtime::{
    ActivityLog, ClientOptions, ClipboardMonitor, SyncClient, host_name, platform_name,
    system_backend,
};
use tracing::{debug, warn};

use crate::bootstrap::{CliContext, shutdown_signal};
use crate::error::CliError;

/// How often to check whether the connect loop gave up.
const LIVENESS_CHECK: Duration = Duration::from_secs(1);

pub fn client_options(settings: &Settings) -> ClientOptions {
    ClientOptions {
        reconnect_interval: Duration::from_secs(settings.effective_reconnect_interval_secs()),
        heartbeat_interval: Duration::from_secs(settings.effective_heartbeat_interval_secs()),
        ..ClientOptions::default()
    }
}

pub async fn execute(
    ctx: &CliContext,
    url: &str,
    device_name: Option<String>,
) -> Result<(), CliError> {
    let settings = &ctx.settings;
    let device_name = device_name.unwrap_or_else(|| settings.effective_device_name(host_name));
    let log: Arc<dyn LogSinkPort> = Arc::new(ActivityLog::new(
        settings.effective_max_logs(),
        Arc::new(NoopEmitter::new()),
    ));

    let client = Arc::new(SyncClient::new(
        device_name,
        platform_name(),
        log,
        client_options(settings),
    ));
    let monitor = Arc::new(ClipboardMonitor::new(
        system_backend(),
        Duration::from_millis(settings.effective_poll_interval_ms()),
    ));

    let writer = Arc::clone(&monitor);
    client.on_clipboard(Arc::new(move |content: ClipboardContent| {
        let writer = Arc::clone(&writer);
        tokio::spawn(async move {
            if let Err(e) = writer.set_clipboard(&content).await {
                warn!("Failed to set clipboard: {e}");
            }
        });
    }));

    let sender = Arc::clone(&client);
    monitor
        .start(Arc::new(move |content: ClipboardContent| {
            let sender = Arc::clone(&sender);
            tokio::spawn(async move {
                if let Err(e) = sender.send_clipboard(&content).await {
                    debug!("Local change not sent: {e}");
                }
            });
        }))
        .await?;

    if let Err(e) = client.connect(url).await {
        monitor.stop().await;
        return Err(e.into());
    }
    println!("Syncing clipboard with {url}. Press Ctrl+C to stop.");

    let result = watch(&client, url).await;
    monitor.stop().await;
    client.disconnect().await;
    result
}

/// Wait for Ctrl+C, or fail once the client stops retrying.
async fn watch(client: &SyncClient, url: &str) -> Result<(), CliError> {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut check = tokio::time::interval(LIVENESS_CHECK);

    loop {
        tokio::select! {
            () = &mut shutdown => return Ok(()),
            _ = check.tick() => {
                if !client.is_active().await {
                    return Err(CliError::Connection(format!("could not connect to {url}")));
                }
            }
        }
    }
}
