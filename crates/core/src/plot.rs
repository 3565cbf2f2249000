//! Plot type enumeration and the user's plot selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Wire name of the "render every plot type" selection.
pub const ALL_THREE: &str = "all_three";

/// A single plot kind the backend can render.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlotType {
    Map,
    ZonalMean,
    Contour,
}

impl PlotType {
    pub const ALL: [PlotType; 3] = [PlotType::Map, PlotType::ZonalMean, PlotType::Contour];

    /// Key used by the backend in requests and result maps.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::ZonalMean => "zonal_mean",
            Self::Contour => "contour",
        }
    }

    /// Human-readable label for display in the UI.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Map => "Geographic Map",
            Self::ZonalMean => "Zonal Mean Plot",
            Self::Contour => "Contour Plot",
        }
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlotType::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown plot type: {s}")))
    }
}

/// Label for a result-map key; unknown keys are shown as-is.
pub fn display_name_for(key: &str) -> &str {
    key.parse::<PlotType>()
        .map(PlotType::display_name)
        .unwrap_or(key)
}

/// What the user asked to render: one plot type, or all three at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotSelection {
    Single(PlotType),
    AllThree,
}

impl PlotSelection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single(plot) => plot.as_str(),
            Self::AllThree => ALL_THREE,
        }
    }

    pub fn plot_types(self) -> Vec<PlotType> {
        match self {
            Self::Single(plot) => vec![plot],
            Self::AllThree => PlotType::ALL.to_vec(),
        }
    }
}

impl fmt::Display for PlotSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotSelection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_THREE {
            Ok(Self::AllThree)
        } else {
            s.parse().map(Self::Single)
        }
    }
}
