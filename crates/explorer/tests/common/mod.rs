#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use clearsky_core::envelope::{HealthStatus, ParallelJobResponse, VisualizeAllResponse};
use clearsky_core::job::JobStatus;
use clearsky_core::request::{ParallelJobRequest, VisualizeAllRequest};
use clearsky_harmony::{HarmonyApiError, VisualizationBackend};

/// A 1x1 transparent PNG.
pub const PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn api_error(status: u16, message: &str) -> HarmonyApiError {
    HarmonyApiError::Api {
        status,
        message: message.to_string(),
    }
}

pub fn status(value: serde_json::Value) -> JobStatus {
    serde_json::from_value(value).unwrap()
}

pub fn processing(job_id: &str, progress: f64) -> JobStatus {
    status(json!({"job_id": job_id, "status": "processing", "progress": progress}))
}

pub fn completed_map(job_id: &str) -> JobStatus {
    status(json!({
        "job_id": job_id,
        "status": "completed",
        "progress": 100.0,
        "completed_plots": ["map"],
        "results": {"map": {"success": true, "image_base64": PNG_BASE64}},
    }))
}

pub fn all_three_response() -> VisualizeAllResponse {
    serde_json::from_value(json!({
        "success": true,
        "data": {
            "job_id": "all-1",
            "files_processed": 2,
            "visualizations": {
                "map": {"success": true, "image_base64": PNG_BASE64},
                "zonal_mean": {"success": true, "image_base64": PNG_BASE64},
                "contour": {"success": false, "error": "no data"},
            },
            "success_count": 2,
            "total_count": 3,
        }
    }))
    .unwrap()
}

pub fn accepted(job_id: &str) -> ParallelJobResponse {
    serde_json::from_value(json!({"success": true, "job_id": job_id})).unwrap()
}

/// Backend whose answers are scripted up front. Each operation counts
/// its calls; status answers are consumed in order and the job reports
/// "processing" once the script runs out.
#[derive(Default)]
pub struct ScriptedBackend {
    pub healthy: Mutex<Option<String>>,
    pub all_responses: Mutex<VecDeque<Result<VisualizeAllResponse, HarmonyApiError>>>,
    pub job_responses: Mutex<VecDeque<Result<ParallelJobResponse, HarmonyApiError>>>,
    pub statuses: Mutex<VecDeque<Result<JobStatus, HarmonyApiError>>>,

    pub health_calls: AtomicUsize,
    pub all_calls: AtomicUsize,
    pub job_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn healthy() -> Self {
        let backend = Self::default();
        *backend.healthy.lock().unwrap() = Some("healthy".to_string());
        backend
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_all(self, response: Result<VisualizeAllResponse, HarmonyApiError>) -> Self {
        self.all_responses.lock().unwrap().push_back(response);
        self
    }

    pub fn with_job(self, response: Result<ParallelJobResponse, HarmonyApiError>) -> Self {
        self.job_responses.lock().unwrap().push_back(response);
        self
    }

    pub fn with_statuses(
        self,
        statuses: impl IntoIterator<Item = Result<JobStatus, HarmonyApiError>>,
    ) -> Self {
        self.statuses.lock().unwrap().extend(statuses);
        self
    }

    pub fn calls(&self) -> (usize, usize, usize, usize) {
        (
            self.health_calls.load(Ordering::SeqCst),
            self.all_calls.load(Ordering::SeqCst),
            self.job_calls.load(Ordering::SeqCst),
            self.status_calls.load(Ordering::SeqCst),
        )
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisualizationBackend for ScriptedBackend {
    async fn check_health(&self) -> Result<HealthStatus, HarmonyApiError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        match self.healthy.lock().unwrap().clone() {
            Some(status) => Ok(serde_json::from_value(json!({"status": status})).unwrap()),
            None => Err(api_error(503, "API responded with status 503")),
        }
    }

    async fn visualize_all(
        &self,
        _request: &VisualizeAllRequest,
    ) -> Result<VisualizeAllResponse, HarmonyApiError> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        self.all_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(api_error(500, "no scripted response")))
    }

    async fn start_job(
        &self,
        _request: &ParallelJobRequest,
    ) -> Result<ParallelJobResponse, HarmonyApiError> {
        self.job_calls.fetch_add(1, Ordering::SeqCst);
        self.job_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(api_error(500, "no scripted response")))
    }

    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, HarmonyApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(processing(job_id, 50.0)))
    }
}
