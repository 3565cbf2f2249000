//! REST client for the Harmony visualization API.
//!
//! Wraps the backend's HTTP endpoints (health, one-shot rendering, job
//! submission, job status and results, cache status) using [`reqwest`].
//! Every call is attempted exactly once.

use serde::de::DeserializeOwned;
use serde::Serialize;

use clearsky_core::envelope::{HealthStatus, ParallelJobResponse, VisualizeAllResponse};
use clearsky_core::job::JobStatus;

use crate::config::HarmonyConfig;

/// HTTP client for the Harmony API.
#[derive(Debug, Clone)]
pub struct HarmonyApi {
    client: reqwest::Client,
    config: HarmonyConfig,
}

/// Errors from the Harmony REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum HarmonyApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout) or the
    /// body could not be decoded.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The backend's own error message, or a generic one naming the status.
        message: String,
    },
}

impl HarmonyApi {
    /// Create a new API client from validated configuration.
    pub fn new(config: HarmonyConfig) -> Result<Self, HarmonyApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: HarmonyConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &HarmonyConfig {
        &self.config
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, HarmonyApiError> {
        self.get(&["health"]).await
    }

    /// `POST /tempo/visualize/all` -- render every plot type in one round trip.
    pub async fn submit_all<B>(&self, body: &B) -> Result<VisualizeAllResponse, HarmonyApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post(&["tempo", "visualize", "all"], body).await
    }

    /// `POST /tempo/visualize/parallel` -- queue an asynchronous job.
    pub async fn submit_parallel<B>(
        &self,
        body: &B,
    ) -> Result<ParallelJobResponse, HarmonyApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post(&["tempo", "visualize", "parallel"], body).await
    }

    /// `GET /tempo/visualize/status/{job_id}`.
    pub async fn job_status(&self, job_id: &str) -> Result<JobStatus, HarmonyApiError> {
        self.get(&["tempo", "visualize", "status", job_id]).await
    }

    /// `GET /tempo/visualize/results/{job_id}`. The payload is passed
    /// through untyped.
    pub async fn job_results(&self, job_id: &str) -> Result<serde_json::Value, HarmonyApiError> {
        self.get(&["tempo", "visualize", "results", job_id]).await
    }

    /// `GET /cache/status`.
    pub async fn cache_status(&self) -> Result<serde_json::Value, HarmonyApiError> {
        self.get(&["cache", "status"]).await
    }

    // ---- private helpers ----

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, HarmonyApiError> {
        let url = self.config.endpoint(segments);
        tracing::debug!(%url, "GET Harmony API");

        let response = self
            .client
            .get(url)
            .bearer_auth(self.config.api_token())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T, HarmonyApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let url = self.config.endpoint(segments);
        tracing::debug!(%url, "POST Harmony API");

        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.api_token())
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code. On failure the
    /// backend's `message` (or FastAPI `detail`) field becomes the error
    /// message when present.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, HarmonyApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body)
                .unwrap_or_else(|| format!("API responded with status {}", status.as_u16()));
            return Err(HarmonyApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, HarmonyApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Pull a human-readable message out of an error body, if it has one.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .filter_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .find(|msg| !msg.is_empty())
        .map(str::to_owned)
}
