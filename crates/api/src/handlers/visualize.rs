//! Handlers for the `/tempo/visualize` forwarders.
//!
//! Request bodies are only checked for JSON parseability; domain
//! validation is left to the client and the backend.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use clearsky_core::envelope::{ParallelJobResponse, VisualizeAllResponse};
use clearsky_core::job::JobStatus;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const MSG_ALL_FAILED: &str = "Failed to connect to Harmony API";
pub const MSG_PARALLEL_FAILED: &str = "Failed to start parallel visualization";
pub const MSG_STATUS_FAILED: &str = "Failed to get job status";
pub const MSG_RESULTS_FAILED: &str = "Failed to get job results";

fn json_body(
    body: Result<Json<serde_json::Value>, JsonRejection>,
    message: &'static str,
) -> AppResult<serde_json::Value> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidBody { message, rejection })
}

// ---------------------------------------------------------------------------
// All three plots
// ---------------------------------------------------------------------------

/// POST /tempo/visualize/all
pub async fn visualize_all(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> AppResult<Json<VisualizeAllResponse>> {
    let body = json_body(body, MSG_ALL_FAILED)?;
    let response = state
        .harmony
        .submit_all(&body)
        .await
        .map_err(AppError::upstream(MSG_ALL_FAILED))?;

    tracing::info!(
        success = response.success,
        visualizations = response
            .data
            .as_ref()
            .and_then(|d| d.visualizations.as_ref())
            .map_or(0, |v| v.len()),
        "All-plots request forwarded",
    );

    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// POST /tempo/visualize/parallel
pub async fn submit_parallel(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> AppResult<Json<ParallelJobResponse>> {
    let body = json_body(body, MSG_PARALLEL_FAILED)?;
    let response = state
        .harmony
        .submit_parallel(&body)
        .await
        .map_err(AppError::upstream(MSG_PARALLEL_FAILED))?;

    tracing::info!(
        success = response.success,
        job_id = response.job_id.as_deref().unwrap_or(""),
        "Parallel job submitted",
    );

    Ok(Json(response))
}

/// GET /tempo/visualize/status/{job_id}
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobStatus>> {
    let status = state
        .harmony
        .job_status(&job_id)
        .await
        .map_err(AppError::upstream(MSG_STATUS_FAILED))?;

    tracing::debug!(
        job_id = %job_id,
        status = ?status.status,
        progress = status.progress,
        "Job status forwarded",
    );

    Ok(Json(status))
}

/// GET /tempo/visualize/results/{job_id}
pub async fn job_results(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let results = state
        .harmony
        .job_results(&job_id)
        .await
        .map_err(AppError::upstream(MSG_RESULTS_FAILED))?;

    Ok(Json(results))
}
