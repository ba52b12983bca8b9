use marker_gauge_core::GeometryError;
use marker_gauge_estimators::EstimationMethod;
use marker_gauge_temporal::TemporalError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown when fewer than two markers are found in a frame.
pub const INSUFFICIENT_MARKERS_GUIDANCE: &str = "at least two markers must be visible; \
make sure both markers are fully in frame, well lit and not blurred, then try again";

/// Stable tag reported with every failed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InsufficientMarkers,
    DegenerateGeometry,
    DecodeError,
    ConfigurationError,
    InvalidRequest,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InsufficientMarkers => "insufficient_markers",
            ErrorKind::DegenerateGeometry => "degenerate_geometry",
            ErrorKind::DecodeError => "decode_error",
            ErrorKind::ConfigurationError => "configuration_error",
            ErrorKind::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unknown detection profile name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown detection profile '{name}' (expected 'fast' or 'precise')")]
pub struct ProfileError {
    pub name: String,
}

/// Reading, writing or validating a JSON config file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("`{field}` must be a positive number (got {value})")]
    NotPositive { field: &'static str, value: f64 },
}

/// Everything that can make a measurement request fail.
#[derive(thiserror::Error, Debug)]
pub enum MeasureError {
    #[error("{} (found {found})", INSUFFICIENT_MARKERS_GUIDANCE)]
    InsufficientMarkers { found: usize },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Temporal(#[from] TemporalError),
    #[cfg(feature = "image")]
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("estimator '{0}' produced no value")]
    MissingEstimate(EstimationMethod),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl MeasureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeasureError::InsufficientMarkers { .. } => ErrorKind::InsufficientMarkers,
            MeasureError::Geometry(GeometryError::NonPositiveSideLength { .. }) => {
                ErrorKind::InvalidRequest
            }
            MeasureError::Geometry(_) => ErrorKind::DegenerateGeometry,
            MeasureError::Temporal(
                TemporalError::TimestampRegression { .. }
                | TemporalError::NonFiniteTimestamp { .. },
            ) => ErrorKind::InvalidRequest,
            MeasureError::Temporal(TemporalError::NonFiniteSample { .. }) => {
                ErrorKind::DegenerateGeometry
            }
            #[cfg(feature = "image")]
            MeasureError::Decode(_) => ErrorKind::DecodeError,
            MeasureError::Profile(_) => ErrorKind::ConfigurationError,
            MeasureError::MissingEstimate(_) => ErrorKind::DegenerateGeometry,
            MeasureError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }
}
