//! Composition root for the web adapter.
//!
//! Builds the [`SyncService`] with an SSE-backed event emitter and serves
//! the control API, optionally with the web UI's static assets.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use nextpaste_core::{
    AppEventEmitter, ClipboardBackend, CoreError, Settings, SettingsUpdate, load_settings_from,
    save_settings_to, settings_path, validate_settings,
};
use nextpaste_runtime::{ServiceOptions, SyncService, system_backend};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::sse::SseBroadcaster;

/// Default port for the control API.
pub const DEFAULT_WEB_PORT: u16 = 9887;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Configuration for the control API server.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// Optional path to static assets for SPA serving.
    pub static_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Settings file read at startup and written by `PUT /api/settings`.
    pub settings_path: PathBuf,
    /// Start the sync server from saved settings before serving.
    pub autostart: bool,
}

impl WebConfig {
    /// Loopback-only config using the default settings file.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_WEB_PORT,
            static_dir: None,
            cors: CorsConfig::default(),
            settings_path: settings_path()?,
            autostart: false,
        })
    }
}

/// Everything the handlers need.
pub struct AxumContext {
    pub service: Arc<SyncService>,
    pub sse: Arc<SseBroadcaster>,
    settings: RwLock<Settings>,
    settings_path: PathBuf,
}

impl AxumContext {
    /// Compose a service over `backend` whose events feed a fresh broadcaster.
    pub fn build(
        backend: Arc<dyn ClipboardBackend>,
        settings: Settings,
        settings_path: PathBuf,
    ) -> Self {
        let sse = Arc::new(SseBroadcaster::with_defaults());
        let events: Arc<dyn AppEventEmitter> = sse.clone();
        let service = Arc::new(SyncService::new(
            backend,
            events,
            ServiceOptions::from_settings(&settings),
        ));
        Self {
            service,
            sse,
            settings: RwLock::new(settings),
            settings_path,
        }
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Merge, validate and persist a settings update.
    ///
    /// Nothing is written if validation fails. Runtime tunables (poll
    /// interval, chunk size, log capacity) apply on the next launch.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings, CoreError> {
        let mut current = self.settings.write().await;
        let mut next = current.clone();
        next.merge(update);
        validate_settings(&next)?;
        save_settings_to(&self.settings_path, &next)?;
        *current = next.clone();
        Ok(next)
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }
}

impl std::fmt::Debug for AxumContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxumContext")
            .field("service", &self.service)
            .field("settings_path", &self.settings_path)
            .finish_non_exhaustive()
    }
}

/// Load settings and compose the context with the host clipboard.
pub fn bootstrap(config: &WebConfig) -> Result<AxumContext> {
    let settings = load_settings_from(&config.settings_path)?;
    validate_settings(&settings)?;
    Ok(AxumContext::build(
        system_backend(),
        settings,
        config.settings_path.clone(),
    ))
}

/// Serve the control API until `shutdown` resolves, then stop syncing.
pub async fn start_server<F>(config: WebConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let ctx = bootstrap(&config)?;
    let service = Arc::clone(&ctx.service);

    if config.autostart {
        let server_config = ctx.settings().await.server_config();
        match service.start_server(&server_config).await {
            Ok(addr) => info!("Sync server listening on ws://{addr}/ws"),
            Err(e) => warn!("Autostart failed: {e}"),
        }
    }

    // Choose router based on whether static serving is configured
    let app = if let Some(ref static_dir) = config.static_dir {
        info!("Serving static assets from: {}", static_dir.display());
        crate::routes::create_spa_router(ctx, static_dir, &config.cors)
    } else {
        crate::routes::create_router(ctx, &config.cors)
    };

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;

    if config.static_dir.is_some() {
        info!("NextPaste web server (with UI) listening on http://{addr}");
    } else {
        info!("NextPaste web server (API only) listening on http://{addr}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    service.shutdown().await;
    info!("NextPaste web server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextpaste_runtime::MemoryClipboard;
    use tempfile::tempdir;

    fn context(path: PathBuf) -> AxumContext {
        AxumContext::build(Arc::new(MemoryClipboard::new()), Settings::default(), path)
    }

    #[tokio::test]
    async fn test_update_settings_persists() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        let ctx = context(path.clone());

        let update = SettingsUpdate {
            port: Some(Some(9100)),
            ..Default::default()
        };
        let saved = ctx.update_settings(&update).await.unwrap();
        assert_eq!(saved.port, Some(9100));
        assert_eq!(ctx.settings().await.port, Some(9100));
        assert_eq!(load_settings_from(&path).unwrap(), saved);
    }

    #[tokio::test]
    async fn test_invalid_update_is_not_saved() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        let ctx = context(path.clone());

        let update = SettingsUpdate {
            max_logs: Some(Some(0)),
            ..Default::default()
        };
        let err = ctx.update_settings(&update).await.unwrap_err();
        assert!(matches!(err, CoreError::Settings(_)));
        assert!(!path.exists());
        assert_eq!(ctx.settings().await, Settings::default());
    }

    #[test]
    fn test_bootstrap_rejects_invalid_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"maxLogs": 0}"#).unwrap();

        let config = WebConfig {
            host: "127.0.0.1".into(),
            port: 0,
            static_dir: None,
            cors: CorsConfig::AllowAll,
            settings_path: path,
            autostart: false,
        };
        assert!(bootstrap(&config).is_err());
    }
}
