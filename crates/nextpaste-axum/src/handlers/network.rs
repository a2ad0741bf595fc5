//! Host network information.

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// Addresses other devices can use to reach the sync server.
pub async fn ips(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.local_ips())
}
