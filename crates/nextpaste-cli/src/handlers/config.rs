//! Config command handler.

use nextpaste_core::{Settings, SettingsUpdate, save_settings_to, validate_settings};
use nextpaste_runtime::host_name;

use crate::bootstrap::CliContext;
use crate::config_commands::{ConfigCommand, SetArgs};
use crate::error::CliError;

pub fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            show(ctx, &ctx.settings);
            Ok(())
        }
        ConfigCommand::Set(args) => {
            let settings = apply(ctx, &settings_update(args)?)?;
            println!("✓ Settings updated.");
            show(ctx, &settings);
            Ok(())
        }
        ConfigCommand::Reset => {
            save_settings_to(&ctx.settings_path, &Settings::default())?;
            println!("✓ Settings reset to defaults.");
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", ctx.settings_path.display());
            Ok(())
        }
    }
}

/// Turn the given flags into an update; at least one flag is required.
pub fn settings_update(args: SetArgs) -> Result<SettingsUpdate, CliError> {
    let update = SettingsUpdate {
        address: args.address.map(Some),
        port: args.port.map(Some),
        max_logs: args.max_logs.map(Some),
        chunk_size: args.chunk_size.map(Some),
        heartbeat_interval_secs: args.heartbeat_interval.map(Some),
        reconnect_interval_secs: args.reconnect_interval.map(Some),
        poll_interval_ms: args.poll_interval.map(Some),
        device_name: args.device_name.map(Some),
    };

    let empty = update.address.is_none()
        && update.port.is_none()
        && update.max_logs.is_none()
        && update.chunk_size.is_none()
        && update.heartbeat_interval_secs.is_none()
        && update.reconnect_interval_secs.is_none()
        && update.poll_interval_ms.is_none()
        && update.device_name.is_none();
    if empty {
        return Err(CliError::Arguments(
            "no settings given; see `nextpaste config set --help`".into(),
        ));
    }
    Ok(update)
}

/// Merge, validate and save. Nothing is written if validation fails.
pub fn apply(ctx: &CliContext, update: &SettingsUpdate) -> Result<Settings, CliError> {
    let mut settings = ctx.settings.clone();
    settings.merge(update);
    validate_settings(&settings).map_err(|e| CliError::Config(e.to_string()))?;
    save_settings_to(&ctx.settings_path, &settings)?;
    Ok(settings)
}

fn show(ctx: &CliContext, settings: &Settings) {
    println!("Settings file: {}", ctx.settings_path.display());
    println!();
    println!("  address              {}", settings.effective_address());
    println!("  port                 {}", settings.effective_port());
    println!("  maxLogs              {}", settings.effective_max_logs());
    println!("  chunkSize            {}", settings.effective_chunk_size());
    println!(
        "  heartbeatIntervalSecs {}",
        settings.effective_heartbeat_interval_secs()
    );
    println!(
        "  reconnectIntervalSecs {}",
        settings.effective_reconnect_interval_secs()
    );
    println!(
        "  pollIntervalMs       {}",
        settings.effective_poll_interval_ms()
    );
    println!(
        "  deviceName           {}",
        settings.effective_device_name(host_name)
    );
}
