pub mod cache;
pub mod health;
pub mod visualize;

use axum::Router;

use crate::state::AppState;

/// Build the forwarder route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                              GET   backend health (503 when down)
///
/// /tempo/visualize/all                 POST  render all three plots
/// /tempo/visualize/parallel            POST  submit an asynchronous job
/// /tempo/visualize/status/{job_id}     GET   job status
/// /tempo/visualize/results/{job_id}    GET   job results
///
/// /cache/status                        GET   backend cache status
/// ```
pub fn forwarder_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(visualize::router())
        .merge(cache::router())
}
