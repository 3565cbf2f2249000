use axum::extract::State;
use axum::Json;
use clearsky_core::envelope::HealthStatus;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /health
///
/// Echoes the backend's health payload. Any failure reaching it becomes
/// 503 so "service down" is distinguishable from a malformed request.
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthStatus>> {
    let health = state.harmony.health().await.map_err(AppError::Unhealthy)?;

    tracing::debug!(status = %health.status, "Harmony API health");

    Ok(Json(health))
}
