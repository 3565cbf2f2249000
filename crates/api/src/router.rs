//! Router for the visualization gateway.
//!
//! [`build_app_router`] is shared by the binary and the integration tests
//! so both exercise the same forwarders behind the same middleware.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Headroom left after the Harmony client gives up, so an upstream
/// timeout is still rendered as an envelope instead of a bare 408.
const UPSTREAM_GRACE: Duration = Duration::from_secs(5);

/// Build the gateway [`Router`].
///
/// Every forwarder answers both at its Harmony path (`/health`,
/// `/tempo/visualize/...`, `/cache/status`) and under `/api`, where the
/// browser front-end calls it on the same origin.
///
/// Layers, outermost first: CORS, request id, tracing, request id echo,
/// timeout, panic recovery.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes::forwarder_routes())
        .nest("/api", routes::forwarder_routes())
        // A panicking handler still answers with a 500.
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            gateway_timeout(config),
        ))
        // Echo the id so the browser can quote it when reporting a failed plot.
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Time a forwarded request may take end to end: the configured
/// `REQUEST_TIMEOUT_SECS`, raised when needed to outlast the Harmony
/// client timeout.
pub fn gateway_timeout(config: &ServerConfig) -> Duration {
    Duration::from_secs(config.request_timeout_secs)
        .max(config.harmony.timeout() + UPSTREAM_GRACE)
}

/// CORS for the front-end origins. Only `GET` and `POST` are forwarded.
///
/// Panics on an invalid origin: misconfiguration should fail at startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
