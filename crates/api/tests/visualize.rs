//! Integration tests for the `/tempo/visualize` and `/cache` forwarders.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, post_raw, TEST_TOKEN};
use serde_json::json;
use wiremock::matchers::{body_json as body_matches, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_all_request() -> serde_json::Value {
    json!({
        "start_time": "2023-12-30T22:30:00",
        "end_time": "2023-12-30T22:45:00",
        "plot_type": "all_three",
        "variable": "product/vertical_column_troposphere",
        "collection_id": "C2930730944-LARC_CLOUD",
        "bbox": [-150.0, -40.0, 14.0, 65.0],
    })
}

// ---------------------------------------------------------------------------
// Test: POST /tempo/visualize/all forwards body and echoes the response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn visualize_all_passes_body_and_response_through() {
    let server = MockServer::start().await;
    let backend_response = json!({
        "success": true,
        "message": "done",
        "data": {
            "job_id": "all-1",
            "variable": "product/vertical_column_troposphere",
            "files_processed": 2,
            "visualizations": {
                "map": {"success": true, "image_base64": "iVBORw0KGgo="},
                "zonal_mean": {"success": false, "error": "no data"},
            },
            "success_count": 1,
            "total_count": 2,
            "bbox": [-150.0, -40.0, 14.0, 65.0],
        },
        "processing_seconds": 12.5,
    });
    Mock::given(method("POST"))
        .and(path("/tempo/visualize/all"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .and(body_matches(sample_all_request()))
        .respond_with(ResponseTemplate::new(200).set_body_json(backend_response.clone()))
        .expect(1)
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = post_json(app, "/api/tempo/visualize/all", sample_all_request()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, backend_response);
}

// ---------------------------------------------------------------------------
// Test: backend 500 -> 500 envelope with the backend's message as error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn visualize_all_backend_error_becomes_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tempo/visualize/all"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = post_json(app, "/tempo/visualize/all", sample_all_request()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": false,
            "message": "Failed to connect to Harmony API",
            "error": "boom",
        })
    );
}

#[tokio::test]
async fn visualize_all_without_backend_message_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tempo/visualize/all"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = post_json(app, "/tempo/visualize/all", sample_all_request()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "API responded with status 502");
}

// ---------------------------------------------------------------------------
// Test: malformed JSON body never reaches the backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn visualize_all_rejects_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tempo/visualize/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = post_raw(app, "/tempo/visualize/all", "{not json".to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Failed to connect to Harmony API");
    assert!(json["error"].is_string());
}

// ---------------------------------------------------------------------------
// Test: POST /tempo/visualize/parallel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_parallel_echoes_job_id() {
    let server = MockServer::start().await;
    let request = json!({
        "start_time": "2023-12-30T22:30:00",
        "end_time": "2023-12-30T22:45:00",
        "plot_types": ["map"],
        "variables": ["product/vertical_column_troposphere"],
        "collection_id": "C2930730944-LARC_CLOUD",
    });
    Mock::given(method("POST"))
        .and(path("/tempo/visualize/parallel"))
        .and(body_matches(request.clone()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "job_id": "job-7"})),
        )
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = post_json(app, "/api/tempo/visualize/parallel", request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "job_id": "job-7"})
    );
}

#[tokio::test]
async fn submit_parallel_failure_uses_parallel_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tempo/visualize/parallel"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "bad bbox"})))
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = post_json(app, "/tempo/visualize/parallel", json!({})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": false,
            "message": "Failed to start parallel visualization",
            "error": "bad bbox",
        })
    );
}

// ---------------------------------------------------------------------------
// Test: GET /tempo/visualize/status/{job_id}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn job_status_passes_through() {
    let server = MockServer::start().await;
    let status = json!({
        "job_id": "job-7",
        "status": "processing",
        "progress": 33.5,
        "completed_plots": ["map"],
        "failed_plots": [],
        "results": {
            "map": {"success": true, "image_base64": "iVBORw0KGgo="},
        },
        "worker": "w-2",
    });
    Mock::given(method("GET"))
        .and(path("/tempo/visualize/status/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status.clone()))
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = get(app, "/api/tempo/visualize/status/job-7").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, status);
}

#[tokio::test]
async fn job_status_with_null_collections_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tempo/visualize/status/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "queued",
            "progress": 0,
            "completed_plots": [],
            "failed_plots": [],
            "results": null,
            "error": null,
        })))
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = get(app, "/api/tempo/visualize/status/j1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "queued");
    assert_eq!(json["progress"], 0.0);
    assert_eq!(json["results"], json!({}));
    assert_eq!(json["completed_plots"], json!([]));
}

#[tokio::test]
async fn job_status_failure_uses_status_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tempo/visualize/status/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Job not found"})))
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = get(app, "/tempo/visualize/status/missing").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": false,
            "message": "Failed to get job status",
            "error": "Job not found",
        })
    );
}

// ---------------------------------------------------------------------------
// Test: GET /tempo/visualize/results/{job_id}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn job_results_passes_through() {
    let server = MockServer::start().await;
    let results = json!({
        "job_id": "job-7",
        "results": {"map": {"success": true, "image_base64": "iVBORw0KGgo="}},
    });
    Mock::given(method("GET"))
        .and(path("/tempo/visualize/results/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results.clone()))
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = get(app, "/tempo/visualize/results/job-7").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, results);
}

// ---------------------------------------------------------------------------
// Test: GET /cache/status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cache_status_passes_through() {
    let server = MockServer::start().await;
    let cache = json!({"entries": 4, "size_mb": 12.5});
    Mock::given(method("GET"))
        .and(path("/cache/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cache.clone()))
        .mount(&server)
        .await;
    let app = common::build_test_app(&server.uri());

    let response = get(app, "/api/cache/status").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, cache);
}

#[tokio::test]
async fn cache_status_unreachable_backend_returns_envelope() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);
    let app = common::build_test_app(&uri);

    let response = get(app, "/cache/status").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Failed to get cache status");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("HTTP request failed"));
}
