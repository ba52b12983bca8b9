//! Core types and utilities for marker-based distance measurement.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete marker detector or image codec: corner sets come in
//! as [`MarkerObservation`]s and pixels as [`GrayImageView`]s.

mod error;
mod image;
mod logger;
mod marker;
mod scale;
pub mod stats;

pub use error::GeometryError;
pub use image::GrayImageView;
pub use marker::{direction_between, FrameSize, MarkerObservation, PixelPoint, SupportSegment};
pub use scale::Scale;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV_VAR};

/// Lengths (pixels) at or below this value are treated as zero.
pub const GEOMETRY_EPS: f64 = 1e-9;
