//! Abstraction over the four backend operations the explorer needs.
//!
//! [`HarmonyApi`] is the production implementation; tests drive the
//! poller and session with scripted fakes.

use async_trait::async_trait;

use clearsky_core::envelope::{HealthStatus, ParallelJobResponse, VisualizeAllResponse};
use clearsky_core::job::JobStatus;
use clearsky_core::request::{ParallelJobRequest, VisualizeAllRequest};

use crate::api::{HarmonyApi, HarmonyApiError};

#[async_trait]
pub trait VisualizationBackend: Send + Sync {
    async fn check_health(&self) -> Result<HealthStatus, HarmonyApiError>;

    async fn visualize_all(
        &self,
        request: &VisualizeAllRequest,
    ) -> Result<VisualizeAllResponse, HarmonyApiError>;

    async fn start_job(
        &self,
        request: &ParallelJobRequest,
    ) -> Result<ParallelJobResponse, HarmonyApiError>;

    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, HarmonyApiError>;
}

#[async_trait]
impl VisualizationBackend for HarmonyApi {
    async fn check_health(&self) -> Result<HealthStatus, HarmonyApiError> {
        self.health().await
    }

    async fn visualize_all(
        &self,
        request: &VisualizeAllRequest,
    ) -> Result<VisualizeAllResponse, HarmonyApiError> {
        self.submit_all(request).await
    }

    async fn start_job(
        &self,
        request: &ParallelJobRequest,
    ) -> Result<ParallelJobResponse, HarmonyApiError> {
        self.submit_parallel(request).await
    }

    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, HarmonyApiError> {
        self.job_status(job_id).await
    }
}
