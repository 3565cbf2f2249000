//! Route definitions for the `/tempo/visualize` forwarders.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::visualize;
use crate::state::AppState;

/// ```text
/// POST   /tempo/visualize/all                -> visualize_all
/// POST   /tempo/visualize/parallel           -> submit_parallel
/// GET    /tempo/visualize/status/{job_id}    -> job_status
/// GET    /tempo/visualize/results/{job_id}   -> job_results
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tempo/visualize/all", post(visualize::visualize_all))
        .route("/tempo/visualize/parallel", post(visualize::submit_parallel))
        .route("/tempo/visualize/status/{job_id}", get(visualize::job_status))
        .route("/tempo/visualize/results/{job_id}", get(visualize::job_results))
}
