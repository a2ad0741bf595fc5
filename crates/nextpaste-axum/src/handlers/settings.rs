//! Settings handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use nextpaste_core::{Settings, SettingsUpdate};

use crate::error::HttpError;
use crate::state::AppState;

pub async fn get(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings().await)
}

/// Apply a partial update. Absent keys are kept, `null` resets to default.
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<Settings>, HttpError> {
    let Json(update) = payload?;
    let settings = state.update_settings(&update).await?;
    tracing::info!(path = %state.settings_path().display(), "Settings updated");
    Ok(Json(settings))
}
