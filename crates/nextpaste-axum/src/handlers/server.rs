//! Sync server lifecycle handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use nextpaste_core::{ServerConfig, ServerStatus};
use serde::Serialize;

use crate::error::HttpError;
use crate::state::AppState;

/// Response for a successful start.
#[derive(Debug, Serialize)]
pub struct StartResponse {
    /// Bound `ip:port`, with the real port when 0 was requested.
    pub address: String,
}

pub async fn status(State(state): State<AppState>) -> Json<ServerStatus> {
    Json(state.service.server_status().await)
}

pub async fn start(
    State(state): State<AppState>,
    payload: Result<Json<ServerConfig>, JsonRejection>,
) -> Result<Json<StartResponse>, HttpError> {
    let Json(config) = payload?;
    let addr = state.service.start_server(&config).await?;
    Ok(Json(StartResponse {
        address: addr.to_string(),
    }))
}

pub async fn stop(State(state): State<AppState>) -> Result<Json<ServerStatus>, HttpError> {
    state.service.stop_server().await?;
    Ok(Json(state.service.server_status().await))
}
