//! Corner-pair distance averaging.
//!
//! Each corner of the first marker is paired with the corner of the second
//! marker that lies farthest ahead along the centroid-to-centroid direction.
//! This is a heuristic correspondence, not a nearest-edge match, and ties go
//! to the lowest corner index. The four pair distances are then averaged with
//! weights that favor values near their median.

use crate::projection::farthest_along;
use crate::{DistanceEstimate, DistanceEstimator, EstimationMethod};
use marker_gauge_core::stats::median;
use marker_gauge_core::{
    direction_between, GeometryError, MarkerObservation, Scale, SupportSegment, GEOMETRY_EPS,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiPointParams {
    /// Deviation scale relative to the median: weight = `1 / (1 + dev / (median * smoothing_rel))`.
    pub smoothing_rel: f64,
}

impl Default for MultiPointParams {
    fn default() -> Self {
        Self { smoothing_rel: 0.1 }
    }
}

/// Full output of [`MultiPointEstimator::estimate_pairs`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiPointEstimate {
    pub value_m: f64,
    /// Raw centroid distance in meters, reported alongside for comparison.
    pub centroid_distance_m: f64,
    pub pair_distances_px: [f64; 4],
    /// Normalized weights, aligned with `pairs`.
    pub weights: [f64; 4],
    pub pairs: [SupportSegment; 4],
}

#[derive(Clone, Debug, Default)]
pub struct MultiPointEstimator {
    params: MultiPointParams,
}

impl MultiPointEstimator {
    pub fn new(params: MultiPointParams) -> Self {
        Self { params }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(first = first.id, second = second.id))
    )]
    pub fn estimate_pairs(
        &self,
        first: &MarkerObservation,
        second: &MarkerObservation,
        scale: &Scale,
    ) -> Result<MultiPointEstimate, GeometryError> {
        let direction = direction_between(first, second)?;

        let pairs: [SupportSegment; 4] = first.corners.map(|corner| {
            let idx = farthest_along(&second.corners, &corner, &direction);
            SupportSegment::new(corner, second.corners[idx])
        });
        let distances = pairs.map(|p| p.length_px());

        let med = median(&distances).ok_or(GeometryError::ZeroMedianDistance)?;
        if med <= GEOMETRY_EPS {
            return Err(GeometryError::ZeroMedianDistance);
        }

        let spread = med * self.params.smoothing_rel;
        let raw = distances.map(|d| 1.0 / (1.0 + (d - med).abs() / spread));
        let total: f64 = raw.iter().sum();
        let weights = raw.map(|w| w / total);

        // median plus weighted residuals: exact when every pair agrees
        let value_px = med
            + weights
                .iter()
                .zip(distances.iter())
                .map(|(w, d)| w * (d - med))
                .sum::<f64>();

        let centroid_px = nalgebra::distance(&first.centroid(), &second.centroid());

        log::debug!(
            "multi-point: pairs={:?} weights={:?} value_px={:.3}",
            distances,
            weights,
            value_px
        );

        Ok(MultiPointEstimate {
            value_m: scale.to_meters(value_px),
            centroid_distance_m: scale.to_meters(centroid_px),
            pair_distances_px: distances,
            weights,
            pairs,
        })
    }
}

impl DistanceEstimator for MultiPointEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::MultiPoint
    }

    fn estimate(
        &self,
        first: &MarkerObservation,
        second: &MarkerObservation,
        scale: &Scale,
    ) -> Result<DistanceEstimate, GeometryError> {
        let est = self.estimate_pairs(first, second, scale)?;
        Ok(DistanceEstimate {
            method: EstimationMethod::MultiPoint,
            value_m: est.value_m,
            support: est.pairs.to_vec(),
        })
    }
}
