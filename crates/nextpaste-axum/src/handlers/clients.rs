use axum::Json;
use axum::extract::State;
use nextpaste_core::ClientInfo;

use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Json<Vec<ClientInfo>> {
    Json(state.service.clients())
}
