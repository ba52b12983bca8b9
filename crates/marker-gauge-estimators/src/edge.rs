use crate::projection::farthest_along;
use crate::{DistanceEstimate, DistanceEstimator, EstimationMethod};
use marker_gauge_core::{
    direction_between, GeometryError, MarkerObservation, PixelPoint, Scale, SupportSegment,
};
use nalgebra::Unit;

/// Facing corners of the two markers and the gap between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeEstimate {
    /// Corner of the first marker closest to the second along the line of travel.
    pub edge1: PixelPoint,
    /// Corner of the second marker closest to the first.
    pub edge2: PixelPoint,
    pub distance_px: f64,
    pub value_m: f64,
}

/// Distance between the two facing corners of the markers.
///
/// Reported when the other estimators disagree.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeEstimator;

impl EdgeEstimator {
    pub fn estimate_edges(
        &self,
        first: &MarkerObservation,
        second: &MarkerObservation,
        scale: &Scale,
    ) -> Result<EdgeEstimate, GeometryError> {
        let direction = direction_between(first, second)?;
        let i1 = farthest_along(&first.corners, &first.centroid(), &direction);
        let backward = Unit::new_unchecked(-direction.into_inner());
        let i2 = farthest_along(&second.corners, &second.centroid(), &backward);
        let edge1 = first.corners[i1];
        let edge2 = second.corners[i2];
        let distance_px = nalgebra::distance(&edge1, &edge2);

        Ok(EdgeEstimate {
            edge1,
            edge2,
            distance_px,
            value_m: scale.to_meters(distance_px),
        })
    }
}

impl DistanceEstimator for EdgeEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Edge
    }

    fn estimate(
        &self,
        first: &MarkerObservation,
        second: &MarkerObservation,
        scale: &Scale,
    ) -> Result<DistanceEstimate, GeometryError> {
        let edges = self.estimate_edges(first, second, scale)?;
        Ok(DistanceEstimate {
            method: EstimationMethod::Edge,
            value_m: edges.value_m,
            support: vec![SupportSegment::new(edges.edge1, edges.edge2)],
        })
    }
}
