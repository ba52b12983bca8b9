use crate::{DistanceEstimate, DistanceEstimator, EstimationMethod};
use marker_gauge_core::{GeometryError, MarkerObservation, Scale, SupportSegment};

/// Naive baseline: distance between the two marker centroids.
#[derive(Clone, Copy, Debug, Default)]
pub struct CentroidEstimator;

impl DistanceEstimator for CentroidEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Centroid
    }

    fn estimate(
        &self,
        first: &MarkerObservation,
        second: &MarkerObservation,
        scale: &Scale,
    ) -> Result<DistanceEstimate, GeometryError> {
        let segment = SupportSegment::new(first.centroid(), second.centroid());
        Ok(DistanceEstimate {
            method: EstimationMethod::Centroid,
            value_m: scale.to_meters(segment.length_px()),
            support: vec![segment],
        })
    }
}
