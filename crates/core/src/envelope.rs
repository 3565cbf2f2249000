//! Response shapes exchanged with the Harmony API and with browsers.
//!
//! Each backend endpoint has its own type with explicit optional fields.
//! Fields the backend adds beyond these are kept in `extra` so a
//! forwarder can echo the payload unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job::{JobHandle, PlotResult};
use crate::types::ExtraFields;

/// `GET /health` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// `POST /tempo/visualize/all` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizeAllResponse {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<VisualizeAllData>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizeAllData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_processed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<BTreeMap<String, PlotResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// `POST /tempo/visualize/parallel` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelJobResponse {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ParallelJobResponse {
    /// Interpret the payload as an accepted job.
    pub fn into_handle(self) -> Result<JobHandle, CoreError> {
        match (self.success, self.job_id) {
            (true, Some(job_id)) if !job_id.is_empty() => Ok(JobHandle::new(job_id)),
            (true, _) => Err(CoreError::Rejected(
                "Backend accepted the job without a job id".into(),
            )),
            (false, _) => Err(CoreError::Rejected(
                self.message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Failed to start parallel processing".into()),
            )),
        }
    }
}

/// Normalized success/failure wrapper returned by the forwarders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ResultEnvelope<T> {
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Body of a failed health check. Mirrors [`HealthStatus`] so callers
/// always see a `status` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthFailure {
    pub status: String,
    pub message: String,
    pub error: String,
    pub timestamp: String,
    pub version: String,
}
