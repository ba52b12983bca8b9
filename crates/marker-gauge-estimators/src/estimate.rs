use marker_gauge_core::{GeometryError, MarkerObservation, Scale, SupportSegment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which strategy produced a [`DistanceEstimate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    Centroid,
    Edge,
    MultiPoint,
    Perspective,
}

impl EstimationMethod {
    pub const ALL: [EstimationMethod; 4] = [
        EstimationMethod::Centroid,
        EstimationMethod::Edge,
        EstimationMethod::MultiPoint,
        EstimationMethod::Perspective,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EstimationMethod::Centroid => "centroid",
            EstimationMethod::Edge => "edge",
            EstimationMethod::MultiPoint => "multi_point",
            EstimationMethod::Perspective => "perspective",
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One method's distance between two markers.
///
/// `support` records the pixel segments the method measured along; it is a
/// reporting artifact for overlays and never feeds back into estimation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceEstimate {
    pub method: EstimationMethod,
    pub value_m: f64,
    pub support: Vec<SupportSegment>,
}

/// A strategy turning two corner sets and a shared scale into a distance.
///
/// Implementations hold only immutable configuration, so one instance can
/// serve any number of requests.
pub trait DistanceEstimator: Send + Sync {
    fn method(&self) -> EstimationMethod;

    fn estimate(
        &self,
        first: &MarkerObservation,
        second: &MarkerObservation,
        scale: &Scale,
    ) -> Result<DistanceEstimate, GeometryError>;
}
