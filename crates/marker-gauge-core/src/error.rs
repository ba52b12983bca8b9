/// Geometric failure modes shared by the calibrator and the estimators.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("marker is degenerate: robust side length is {side_px} px")]
    DegenerateMarker { side_px: f64 },
    #[error("marker centroids coincide; no direction between markers")]
    CoincidentCentroids,
    #[error("median corner-pair distance is zero")]
    ZeroMedianDistance,
    #[error("real side length must be a positive number of meters (got {meters})")]
    NonPositiveSideLength { meters: f64 },
    #[error("invalid frame size {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },
}
