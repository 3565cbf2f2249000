//! Integration tests for the Harmony REST client against a mock backend.

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clearsky_core::job::JobState;
use clearsky_core::request::VisualizationRequest;
use clearsky_harmony::{HarmonyApi, HarmonyApiError, HarmonyConfig, VisualizationBackend};

const TOKEN: &str = "test-token";

fn client_for(server: &MockServer) -> HarmonyApi {
    HarmonyApi::new(HarmonyConfig::new(&server.uri(), TOKEN).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Test: requests carry the bearer token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "timestamp": "2024-01-01T00:00:00",
            "version": "1.0.0",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let health = client_for(&server).health().await.unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version.as_deref(), Some("1.0.0"));
}

// ---------------------------------------------------------------------------
// Test: typed request bodies reach the backend unchanged
// ---------------------------------------------------------------------------

#[tokio::test]
async fn visualize_all_posts_request_body() {
    let server = MockServer::start().await;
    let request = VisualizationRequest::sample().unwrap().to_all_request();

    Mock::given(method("POST"))
        .and(path("/tempo/visualize/all"))
        .and(body_json(&request))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "done",
            "data": {
                "job_id": "j1",
                "visualizations": {"map": {"success": true, "image_base64": "AA=="}},
                "success_count": 1,
                "total_count": 1,
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).visualize_all(&request).await.unwrap();

    assert!(response.success);
    let data = response.data.unwrap();
    assert_eq!(data.job_id.as_deref(), Some("j1"));
    assert!(data.visualizations.unwrap()["map"].success);
}

#[tokio::test]
async fn start_job_returns_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tempo/visualize/parallel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "job_id": "job-7",
        })))
        .mount(&server)
        .await;

    let request = VisualizationRequest::sample().unwrap().to_job_request();
    let handle = client_for(&server)
        .start_job(&request)
        .await
        .unwrap()
        .into_handle()
        .unwrap();

    assert_eq!(handle.job_id, "job-7");
}

#[tokio::test]
async fn job_status_decodes_and_encodes_job_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tempo/visualize/status/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "progress": 33,
            "completed_plots": ["map"],
            "failed_plots": [],
            "results": {},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client_for(&server).job_status("a/b").await.unwrap();

    assert_eq!(status.status, JobState::Processing);
    assert_eq!(status.progress_percent(), 33);
}

// ---------------------------------------------------------------------------
// Test: error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_success_uses_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tempo/visualize/all"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Harmony job failed"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit_all(&json!({"start_time": "x"}))
        .await
        .unwrap_err();

    assert_matches!(err, HarmonyApiError::Api { status: 500, .. });
    assert_eq!(err.to_string(), "Harmony job failed");
}

#[tokio::test]
async fn non_success_without_body_names_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tempo/visualize/status/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).job_status("missing").await.unwrap_err();

    assert_eq!(err.to_string(), "API responded with status 404");
}

#[tokio::test]
async fn fastapi_detail_becomes_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cache/status"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid authentication token"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).cache_status().await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid authentication token");
}

#[tokio::test]
async fn undecodable_body_is_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).health().await.unwrap_err();

    assert_matches!(err, HarmonyApiError::Request(_));
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    let server = MockServer::start().await;
    let config = HarmonyConfig::new(&server.uri(), TOKEN).unwrap();
    drop(server);

    let err = HarmonyApi::new(config).unwrap().health().await.unwrap_err();

    assert_matches!(err, HarmonyApiError::Request(_));
}

#[tokio::test]
async fn results_are_passed_through_untyped() {
    let server = MockServer::start().await;
    let payload = json!({"job_id": "j", "results": {"map": {"success": true}}, "anything": [1, 2]});
    Mock::given(method("GET"))
        .and(path("/tempo/visualize/results/j"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .mount(&server)
        .await;

    let value = client_for(&server).job_results("j").await.unwrap();

    assert_eq!(value, payload);
}
