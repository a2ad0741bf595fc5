//! Router construction.
//!
//! `/health` sits at the root; everything else is nested under `/api`.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// API routes without the `/api` prefix and without state applied.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::server::status))
        .route("/server/start", post(handlers::server::start))
        .route("/server/stop", post(handlers::server::stop))
        .route(
            "/logs",
            get(handlers::logs::list).delete(handlers::logs::clear),
        )
        .route("/network/ips", get(handlers::network::ips))
        .route("/clients", get(handlers::clients::list))
        .route(
            "/settings",
            get(handlers::settings::get).put(handlers::settings::update),
        )
        .route("/events", get(handlers::events::stream))
}

/// Create the API router.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Create the API router plus static assets from `static_dir`.
///
/// Unknown non-API paths are answered with `index.html` so client-side
/// routes survive a reload.
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: AxumContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");
    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    create_router(ctx, cors_config).fallback_service(serve_dir)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
