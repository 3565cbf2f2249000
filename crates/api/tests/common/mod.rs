#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use clearsky_api::config::ServerConfig;
use clearsky_api::router::build_app_router;
use clearsky_api::state::AppState;
use clearsky_harmony::{HarmonyApi, HarmonyConfig};

pub const TEST_TOKEN: &str = "test-token";

/// Build a test `ServerConfig` pointing at the given Harmony API URL.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(harmony_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        harmony: HarmonyConfig::new(harmony_url, TEST_TOKEN).unwrap(),
    }
}

/// Build the full application router with all middleware layers, forwarding
/// to the Harmony API at `harmony_url` (usually a `wiremock::MockServer`).
pub fn build_test_app(harmony_url: &str) -> Router {
    let config = test_config(harmony_url);
    let state = AppState {
        config: Arc::new(config.clone()),
        harmony: Arc::new(HarmonyApi::new(config.harmony.clone()).unwrap()),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
