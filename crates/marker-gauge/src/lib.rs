//! High-level facade crate for the `marker-gauge-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core, estimator and temporal crates,
//! - the [`MethodArbiter`] rule table and the [`MeasurementPipeline`] that
//!   turns two marker corner sets into one [`FinalMeasurement`],
//! - detection profiles and the collaborator traits a detector and a
//!   visualizer implement,
//! - (feature `image`) [`MeasurementService`], which decodes frames, runs a
//!   [`MarkerDetector`], measures per session and renders an overlay.
//!
//! ## Quickstart
//!
//! ```
//! use marker_gauge::core::{FrameSize, MarkerObservation};
//! use marker_gauge::temporal::TemporalFilter;
//! use marker_gauge::MeasurementPipeline;
//!
//! let first = MarkerObservation::from_xy(
//!     1,
//!     [[100.0, 100.0], [150.0, 100.0], [150.0, 150.0], [100.0, 150.0]],
//! );
//! let second = MarkerObservation::from_xy(
//!     2,
//!     [[400.0, 100.0], [450.0, 100.0], [450.0, 150.0], [400.0, 150.0]],
//! );
//! let mut session = TemporalFilter::default();
//! let m = MeasurementPipeline::default()
//!     .measure(&[first, second], 0.05, FrameSize::new(640, 480), &mut session, 0.0)
//!     .unwrap();
//! println!("{:.3} m via {}", m.distance_m, m.method);
//! ```
//!
//! ## API map
//! - `marker_gauge::core`: points, markers, scale, statistics, image views, logging.
//! - `marker_gauge::estimators`: scale calibration and the four distance estimators.
//! - `marker_gauge::temporal`: sliding-window smoothing and the session registry.

pub use marker_gauge_core as core;
pub use marker_gauge_estimators as estimators;
pub use marker_gauge_temporal as temporal;

mod arbiter;
mod config;
mod detect;
mod error;
mod pipeline;
mod profile;
mod response;

#[cfg(feature = "image")]
mod service;
#[cfg(feature = "image")]
mod visualize;

pub use arbiter::{
    select_method, ArbiterOutcome, ArbiterThresholds, MethodAgreement, MethodArbiter,
    PairwiseDifference, SelectedMethod,
};
pub use config::GaugeConfig;
pub use detect::{FixedDetector, MarkerDetector};
pub use error::{
    ConfigIoError, ErrorKind, MeasureError, ProfileError, INSUFFICIENT_MARKERS_GUIDANCE,
};
pub use pipeline::{select_pair, Diagnostics, FinalMeasurement, MeasurementPipeline};
pub use profile::{ArucoTuning, DetectionConfig, DetectionProfile, RefineCriteria};
pub use response::{round_to, MeasureRequest, MeasureResponse, ResponseDiagnostics, ServiceReply};

#[cfg(feature = "image")]
pub use service::MeasurementService;
#[cfg(feature = "image")]
pub use visualize::{Overlay, OverlayRenderer, VisualizationError, Visualizer};

pub use marker_gauge_core::{FrameSize, MarkerObservation};
