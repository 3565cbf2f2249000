//! What the visualization panel shows.
//!
//! The explorer session is the only writer; renderers only read.

use std::collections::BTreeMap;

use crate::envelope::VisualizeAllResponse;
use crate::error::CoreError;
use crate::job::{JobStatus, PlotResult};
use crate::plot::PlotType;
use crate::request::VisualizationRequest;

pub const MSG_PRELOADING: &str = "Loading sample data...";
pub const MSG_PRELOAD_GENERATING: &str = "Generating sample visualizations...";
pub const MSG_GENERATING_ALL: &str = "Generating all three visualizations...";
pub const MSG_TESTING_CONNECTION: &str = "Testing API connection...";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Preloading {
        message: String,
    },
    Loading {
        message: String,
        job: Option<JobStatus>,
    },
    /// Nothing generated yet; offers "start visualizing" / "learn more".
    Empty,
    Error {
        message: String,
        retry_count: u32,
    },
    Ready(VisualizationResult),
}

impl ViewState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Preloading { .. } | Self::Loading { .. })
    }

    pub fn generating(plot: PlotType) -> Self {
        Self::Loading {
            message: format!("Generating {}...", plot.display_name()),
            job: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisualizationResult {
    AllThree(AllThreeSummary),
    Single(SingleResult),
    Health { status: String, message: String },
}

impl VisualizationResult {
    pub fn message(&self) -> &str {
        match self {
            Self::AllThree(summary) => &summary.message,
            Self::Single(single) => &single.message,
            Self::Health { message, .. } => message,
        }
    }

    pub fn health(status: impl Into<String>) -> Self {
        let status = status.into();
        Self::Health {
            message: format!("API is healthy! Status: {status}"),
            status,
        }
    }
}

/// Every plot type rendered in one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AllThreeSummary {
    pub job_id: String,
    pub variable: String,
    pub files_processed: u32,
    pub visualizations: BTreeMap<String, PlotResult>,
    pub success_count: u32,
    pub total_count: u32,
    pub bbox: Option<Vec<f64>>,
    pub message: String,
}

impl AllThreeSummary {
    /// Build a summary from a backend response.
    ///
    /// Counts missing from the payload fall back to the number of
    /// visualizations returned; `fallback_job_id` labels responses
    /// without a job id.
    pub fn from_response(
        response: VisualizeAllResponse,
        request: &VisualizationRequest,
        fallback_job_id: &str,
    ) -> Result<Self, CoreError> {
        let rejected = |message: Option<String>| {
            CoreError::Rejected(
                message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Failed to generate visualizations".into()),
            )
        };

        if !response.success {
            return Err(rejected(response.message));
        }
        let Some(data) = response.data else {
            return Err(rejected(response.message));
        };
        let Some(visualizations) = data.visualizations else {
            return Err(rejected(response.message));
        };

        let rendered = u32::try_from(visualizations.len()).unwrap_or(u32::MAX);
        let success_count = data.success_count.unwrap_or(rendered);

        Ok(Self {
            job_id: data
                .job_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| fallback_job_id.to_string()),
            variable: request.variable().to_string(),
            files_processed: data.files_processed.unwrap_or(1),
            success_count,
            total_count: data.total_count.unwrap_or(rendered),
            bbox: data
                .bbox
                .or_else(|| request.bbox().map(|b| <[f64; 4]>::from(b).to_vec())),
            message: format!("Generated {success_count} visualizations successfully"),
            visualizations,
        })
    }
}

/// One plot produced by an asynchronous job.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleResult {
    pub job_id: String,
    pub plot: PlotType,
    pub variable: String,
    pub result: PlotResult,
    pub message: String,
}

impl SingleResult {
    pub fn new(
        job_id: impl Into<String>,
        plot: PlotType,
        variable: impl Into<String>,
        result: PlotResult,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            plot,
            variable: variable.into(),
            result,
            message: format!("Generated {plot} visualization successfully"),
        }
    }
}
