//! Asynchronous visualization jobs as reported by the backend.

use std::collections::{BTreeMap, BTreeSet};

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::plot::PlotType;
use crate::types::{ExtraFields, Timestamp};

/// Message surfaced when a job fails without an explanation.
pub const DEFAULT_JOB_FAILURE: &str = "Job failed";

/// Handle to a job accepted by the backend. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
    pub submitted_at: Timestamp,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            submitted_at: chrono::Utc::now(),
        }
    }
}

/// Lifecycle state of a backend job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Outcome of rendering one plot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotResult {
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub success: bool,
    /// Base64-encoded PNG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlotResult {
    pub fn has_image(&self) -> bool {
        self.image_base64.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Decode the image payload into raw PNG bytes.
    ///
    /// Returns `Ok(None)` when the result carries no image.
    pub fn decode_image(&self) -> Result<Option<Vec<u8>>, CoreError> {
        let Some(encoded) = self.image_base64.as_deref().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map(Some)
            .map_err(|e| CoreError::InvalidPayload(format!("image is not valid base64: {e}")))
    }
}

/// Snapshot of a job's progress. Always replaced wholesale by a fresh
/// fetch; never patched locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub status: JobState,
    /// Percentage, 0–100.
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub progress: f64,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub completed_plots: BTreeSet<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub failed_plots: BTreeSet<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub results: BTreeMap<String, PlotResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl JobStatus {
    /// Status seeded locally when a job has just been accepted.
    pub fn queued(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            status: JobState::Queued,
            progress: 0.0,
            completed_plots: BTreeSet::new(),
            failed_plots: BTreeSet::new(),
            results: BTreeMap::new(),
            error: None,
            extra: ExtraFields::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn plot_result(&self, plot: PlotType) -> Option<&PlotResult> {
        self.results.get(plot.as_str())
    }

    /// Progress clamped to 0–100 for display.
    pub fn progress_percent(&self) -> u8 {
        self.progress.clamp(0.0, 100.0).round() as u8
    }

    /// Error message for a failed job, falling back to a generic one.
    pub fn failure_message(&self) -> String {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_JOB_FAILURE)
            .to_string()
    }
}
