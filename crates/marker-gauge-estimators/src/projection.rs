use marker_gauge_core::PixelPoint;
use nalgebra::{Unit, Vector2};

/// Index of the point with the largest projection of `p - origin` onto
/// `direction`. Ties resolve to the first index.
pub(crate) fn farthest_along(
    points: &[PixelPoint; 4],
    origin: &PixelPoint,
    direction: &Unit<Vector2<f64>>,
) -> usize {
    let mut best = 0;
    let mut best_proj = f64::NEG_INFINITY;
    for (idx, p) in points.iter().enumerate() {
        let proj = (p - origin).dot(direction.as_ref());
        if proj > best_proj {
            best_proj = proj;
            best = idx;
        }
    }
    best
}
