//! Visualization requests: the form the user fills in, its validated
//! domain form, and the two JSON bodies the Harmony API accepts.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::plot::{PlotSelection, PlotType, ALL_THREE};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// TEMPO NO2 L2 collection queried by every request.
pub const DEFAULT_COLLECTION_ID: &str = "C2930730944-LARC_CLOUD";

pub const DEFAULT_VARIABLE: &str = "product/vertical_column";

/// Variables offered in the form, with a short description of each.
pub const VARIABLES: [(&str, &str); 3] = [
    (
        "product/vertical_column",
        "Total atmospheric column density (molecules/cm²)",
    ),
    (
        "product/vertical_column_troposphere",
        "Tropospheric column density (molecules/cm²)",
    ),
    (
        "product/main_data_quality_flag",
        "Data quality indicator (0=good, 1=questionable, 2=bad)",
    ),
];

pub const SAMPLE_START_TIME: &str = "2023-12-30T22:30";
pub const SAMPLE_END_TIME: &str = "2023-12-30T22:45";

/// North America, as shown in the sample visualizations.
pub const DEFAULT_BBOX: BoundingBox = BoundingBox {
    west: -150.0,
    south: -40.0,
    east: 14.0,
    north: 65.0,
};

/// Time format produced by a `datetime-local` input.
pub const FORM_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
/// Time format the backend expects.
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const BBOX_FORMAT_HINT: &str =
    "Bounding box must be in format: west, south, east, north (e.g., -150, -40, 14, 65)";

// ---------------------------------------------------------------------------
// Bounding box
// ---------------------------------------------------------------------------

/// Geographic extent, serialized as `[west, south, east, north]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", from = "[f64; 4]")]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Parse an optional form field. Blank input means "no bounding box".
    pub fn parse_optional(input: &str) -> Result<Option<Self>, CoreError> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        input.parse().map(Some)
    }
}

impl FromStr for BoundingBox {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| CoreError::Validation(BBOX_FORMAT_HINT.into()))?;

        match parts.as_slice() {
            [west, south, east, north] if parts.iter().all(|v| v.is_finite()) => Ok(Self {
                west: *west,
                south: *south,
                east: *east,
                north: *north,
            }),
            _ => Err(CoreError::Validation(BBOX_FORMAT_HINT.into())),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.west, self.south, self.east, self.north
        )
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.west, b.south, b.east, b.north]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([west, south, east, north]: [f64; 4]) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

// ---------------------------------------------------------------------------
// Validated request
// ---------------------------------------------------------------------------

/// A request that has passed client-side validation.
///
/// Construction enforces `start_time < end_time` and a non-empty variable;
/// a bounding box can only exist in its four-component form.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationRequest {
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    bbox: Option<BoundingBox>,
    variable: String,
    plots: PlotSelection,
    collection_id: String,
}

impl VisualizationRequest {
    pub fn new(
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        bbox: Option<BoundingBox>,
        variable: impl Into<String>,
        plots: PlotSelection,
    ) -> Result<Self, CoreError> {
        if start_time >= end_time {
            return Err(CoreError::Validation(
                "End time must be after start time".into(),
            ));
        }
        let variable = variable.into();
        if variable.trim().is_empty() {
            return Err(CoreError::Validation("Please select a variable".into()));
        }
        Ok(Self {
            start_time,
            end_time,
            bbox,
            variable,
            plots,
            collection_id: DEFAULT_COLLECTION_ID.to_string(),
        })
    }

    /// The fixed request used to warm the explore view.
    pub fn sample() -> Result<Self, CoreError> {
        VisualizationForm {
            plot_type: ALL_THREE.to_string(),
            ..VisualizationForm::default()
        }
        .validate()
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn plots(&self) -> PlotSelection {
        self.plots
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// Body for `POST /tempo/visualize/all`.
    pub fn to_all_request(&self) -> VisualizeAllRequest {
        VisualizeAllRequest {
            start_time: format_wire_time(self.start_time),
            end_time: format_wire_time(self.end_time),
            plot_type: ALL_THREE.to_string(),
            variable: self.variable.clone(),
            collection_id: self.collection_id.clone(),
            bbox: self.bbox,
        }
    }

    /// Body for `POST /tempo/visualize/parallel`.
    pub fn to_job_request(&self) -> ParallelJobRequest {
        ParallelJobRequest {
            start_time: format_wire_time(self.start_time),
            end_time: format_wire_time(self.end_time),
            plot_types: self.plots.plot_types(),
            variables: vec![self.variable.clone()],
            collection_id: self.collection_id.clone(),
            bbox: self.bbox,
        }
    }
}

fn format_wire_time(t: NaiveDateTime) -> String {
    t.format(WIRE_TIME_FORMAT).to_string()
}

fn parse_form_time(field: &str, value: &str) -> Result<NaiveDateTime, CoreError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, FORM_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, WIRE_TIME_FORMAT))
        .map_err(|_| CoreError::Validation(format!("Invalid {field}: {value}")))
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizationForm {
    pub start_time: String,
    pub end_time: String,
    pub bbox: String,
    pub variable: String,
    pub plot_type: String,
}

impl Default for VisualizationForm {
    fn default() -> Self {
        Self {
            start_time: SAMPLE_START_TIME.to_string(),
            end_time: SAMPLE_END_TIME.to_string(),
            bbox: DEFAULT_BBOX.to_string(),
            variable: DEFAULT_VARIABLE.to_string(),
            plot_type: PlotType::Map.as_str().to_string(),
        }
    }
}

impl VisualizationForm {
    /// Validate the form, producing a request ready for submission.
    ///
    /// Nothing here touches the network, so a rejected form never
    /// reaches the backend.
    pub fn validate(&self) -> Result<VisualizationRequest, CoreError> {
        if self.start_time.trim().is_empty() || self.end_time.trim().is_empty() {
            return Err(CoreError::Validation(
                "Please select both start and end times".into(),
            ));
        }
        let start = parse_form_time("start time", &self.start_time)?;
        let end = parse_form_time("end time", &self.end_time)?;
        if start >= end {
            return Err(CoreError::Validation(
                "End time must be after start time".into(),
            ));
        }
        let bbox = BoundingBox::parse_optional(&self.bbox)?;
        let plots: PlotSelection = self.plot_type.trim().parse()?;

        VisualizationRequest::new(start, end, bbox, self.variable.trim(), plots)
    }
}

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

/// All three plots rendered in a single round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizeAllRequest {
    pub start_time: String,
    pub end_time: String,
    pub plot_type: String,
    pub variable: String,
    pub collection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

/// Asynchronous job submission; the backend answers with a job id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelJobRequest {
    pub start_time: String,
    pub end_time: String,
    pub plot_types: Vec<PlotType>,
    pub variables: Vec<String>,
    pub collection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}
