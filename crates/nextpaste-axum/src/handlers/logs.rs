//! Activity log handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use nextpaste_core::LogEntry;

use crate::state::AppState;

/// Current activity log, newest first.
pub async fn list(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    Json(state.service.logs())
}

pub async fn clear(State(state): State<AppState>) -> StatusCode {
    state.service.clear_logs();
    StatusCode::NO_CONTENT
}
