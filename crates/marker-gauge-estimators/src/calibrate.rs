//! Robust scale calibration from a marker's own geometry.
//!
//! A single side is noisy under perspective skew, so all four sides are
//! measured and a median/MAD gate drops the odd one out (typically a
//! foreshortened edge) before averaging.

use marker_gauge_core::stats::RobustSpread;
use marker_gauge_core::{GeometryError, MarkerObservation, Scale};
use serde::{Deserialize, Serialize};

/// Tuning for [`ScaleCalibrator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Sides deviating from the median by more than `outlier_mad_factor * MAD`
    /// are discarded.
    pub outlier_mad_factor: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            outlier_mad_factor: 2.0,
        }
    }
}

/// Robust side length in pixels and how many of the 4 sides supported it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobustSide {
    pub side_px: f64,
    /// Number of sides kept by the MAD gate; `0` means the median fallback.
    pub kept_sides: usize,
}

/// Mean of the sides within `factor * MAD` of the median, or the median
/// itself when every side is rejected.
pub fn robust_side_length(sides: &[f64; 4], factor: f64) -> RobustSide {
    // four elements: median/MAD are always defined
    let Some(spread) = RobustSpread::of(sides) else {
        return RobustSide {
            side_px: 0.0,
            kept_sides: 0,
        };
    };

    let kept: Vec<f64> = sides
        .iter()
        .copied()
        .filter(|&s| spread.is_inlier(s, factor))
        .collect();

    if kept.is_empty() {
        return RobustSide {
            side_px: spread.median,
            kept_sides: 0,
        };
    }

    RobustSide {
        side_px: kept.iter().sum::<f64>() / kept.len() as f64,
        kept_sides: kept.len(),
    }
}

/// Outcome of calibrating against one marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub scale: Scale,
    pub marker_id: u32,
    pub side_lengths_px: [f64; 4],
    pub kept_sides: usize,
}

/// Converts a marker's pixel geometry plus its known real side into a [`Scale`].
#[derive(Clone, Debug, Default)]
pub struct ScaleCalibrator {
    params: CalibrationParams,
}

impl ScaleCalibrator {
    pub fn new(params: CalibrationParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, marker), fields(marker = marker.id))
    )]
    pub fn calibrate(
        &self,
        marker: &MarkerObservation,
        real_side_m: f64,
    ) -> Result<Calibration, GeometryError> {
        let sides = marker.side_lengths();
        let robust = robust_side_length(&sides, self.params.outlier_mad_factor);
        let scale = Scale::from_side(real_side_m, robust.side_px)?;

        log::debug!(
            "calibrated on marker {}: sides={:?} side_px={:.3} kept={} m/px={:.6e}",
            marker.id,
            sides,
            robust.side_px,
            robust.kept_sides,
            scale.meters_per_pixel()
        );

        Ok(Calibration {
            scale,
            marker_id: marker.id,
            side_lengths_px: sides,
            kept_sides: robust.kept_sides,
        })
    }
}
