//! Distance estimation between two markers seen in one frame.
//!
//! Current focus:
//! - robust pixel->meter calibration from one marker's own sides,
//! - four independent estimators behind the [`DistanceEstimator`] trait,
//! - [`EstimatorSet`], which runs a list of estimators on the same input.
//!
//! Marker detection is out of scope; inputs are
//! [`marker_gauge_core::MarkerObservation`]s.

mod calibrate;
mod centroid;
mod edge;
mod estimate;
mod multipoint;
mod perspective;
mod projection;
mod set;

pub use calibrate::{robust_side_length, Calibration, CalibrationParams, RobustSide, ScaleCalibrator};
pub use centroid::CentroidEstimator;
pub use edge::{EdgeEstimate, EdgeEstimator};
pub use estimate::{DistanceEstimate, DistanceEstimator, EstimationMethod};
pub use multipoint::{MultiPointEstimate, MultiPointEstimator, MultiPointParams};
pub use perspective::{PerspectiveEstimator, PerspectiveParams};
pub use set::{EstimateSet, EstimatorSet};

pub use marker_gauge_core::{GeometryError, MarkerObservation, Scale};
