use axum::extract::State;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const MSG_CACHE_FAILED: &str = "Failed to get cache status";

/// GET /cache/status
pub async fn cache_status(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let status = state
        .harmony
        .cache_status()
        .await
        .map_err(AppError::upstream(MSG_CACHE_FAILED))?;

    Ok(Json(status))
}
