//! Position-dependent correction of the centroid distance.
//!
//! Markers far from the image center are assumed to be stretched by the lens,
//! so the centroid distance is shrunk by a factor that grows with each
//! marker's distance from the center. This is an approximation, not a
//! calibrated camera model, and should never be treated as ground truth.

use crate::{DistanceEstimate, DistanceEstimator, EstimationMethod};
use marker_gauge_core::{FrameSize, GeometryError, MarkerObservation, Scale, SupportSegment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerspectiveParams {
    /// Correction added per unit of normalized distance from the image center.
    pub gain: f64,
}

impl Default for PerspectiveParams {
    fn default() -> Self {
        Self { gain: 0.1 }
    }
}

#[derive(Clone, Debug)]
pub struct PerspectiveEstimator {
    frame: FrameSize,
    params: PerspectiveParams,
}

impl PerspectiveEstimator {
    pub fn new(frame: FrameSize, params: PerspectiveParams) -> Self {
        Self { frame, params }
    }

    pub fn for_frame(frame: FrameSize) -> Self {
        Self::new(frame, PerspectiveParams::default())
    }

    #[inline]
    pub fn frame(&self) -> FrameSize {
        self.frame
    }

    /// `1 + |centroid - image center| / (width + height) * gain`.
    pub fn correction_factor(&self, marker: &MarkerObservation) -> Result<f64, GeometryError> {
        let extent = self.frame.extent()?;
        let off_center = nalgebra::distance(&marker.centroid(), &self.frame.center());
        Ok(1.0 + off_center / extent * self.params.gain)
    }
}

impl DistanceEstimator for PerspectiveEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Perspective
    }

    fn estimate(
        &self,
        first: &MarkerObservation,
        second: &MarkerObservation,
        scale: &Scale,
    ) -> Result<DistanceEstimate, GeometryError> {
        let segment = SupportSegment::new(first.centroid(), second.centroid());
        let factor = (self.correction_factor(first)? + self.correction_factor(second)?) / 2.0;
        let corrected_px = segment.length_px() / factor;

        Ok(DistanceEstimate {
            method: EstimationMethod::Perspective,
            value_m: scale.to_meters(corrected_px),
            support: vec![segment],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(id: u32, cx: f64, cy: f64) -> MarkerObservation {
        MarkerObservation::from_xy(
            id,
            [
                [cx - 5.0, cy - 5.0],
                [cx + 5.0, cy - 5.0],
                [cx + 5.0, cy + 5.0],
                [cx - 5.0, cy + 5.0],
            ],
        )
    }

    #[test]
    fn centered_markers_are_not_corrected() {
        let est = PerspectiveEstimator::for_frame(FrameSize::new(200, 100));
        let m = square(0, 100.0, 50.0);
        assert_eq!(est.correction_factor(&m).expect("factor"), 1.0);
    }

    #[test]
    fn off_center_pair_is_shrunk_by_the_mean_factor() {
        // 640x480 frame: center (320, 240), extent 1120
        let est = PerspectiveEstimator::for_frame(FrameSize::new(640, 480));
        let a = square(0, 320.0 - 280.0, 240.0);
        let b = square(1, 320.0 + 280.0, 240.0);
        let scale = Scale::from_side(0.01, 10.0).expect("scale");
        let d = est.estimate(&a, &b, &scale).expect("estimate");
        let factor = 1.0 + 280.0 / 1120.0 * 0.1;
        assert_relative_eq!(d.value_m, 560.0 / factor * 0.001, epsilon = 1e-12);
        assert!(d.value_m < 0.56);
    }

    #[test]
    fn empty_frame_is_rejected() {
        let est = PerspectiveEstimator::for_frame(FrameSize::new(0, 0));
        let scale = Scale::from_side(0.01, 10.0).expect("scale");
        let err = est
            .estimate(&square(0, 0.0, 0.0), &square(1, 20.0, 0.0), &scale)
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidFrame { .. }));
    }
}
