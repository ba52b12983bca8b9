use crate::{GeometryError, GEOMETRY_EPS};
use nalgebra::{Point2, Unit, Vector2};
use serde::{Deserialize, Serialize};

/// A point in image pixel coordinates.
pub type PixelPoint = Point2<f64>;

/// One detected marker: its id and the 4 corners in detector winding order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerObservation {
    pub id: u32,
    pub corners: [PixelPoint; 4],
}

impl MarkerObservation {
    pub fn new(id: u32, corners: [PixelPoint; 4]) -> Self {
        Self { id, corners }
    }

    /// Build from `[x, y]` pairs, e.g. straight out of a detector buffer.
    pub fn from_xy(id: u32, corners: [[f64; 2]; 4]) -> Self {
        Self {
            id,
            corners: corners.map(|[x, y]| Point2::new(x, y)),
        }
    }

    /// Mean of the 4 corners.
    pub fn centroid(&self) -> PixelPoint {
        let sum = self
            .corners
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / 4.0)
    }

    /// Side lengths `|c[i+1] - c[i]|`, wrapping from the last corner to the first.
    pub fn side_lengths(&self) -> [f64; 4] {
        std::array::from_fn(|i| nalgebra::distance(&self.corners[i], &self.corners[(i + 1) % 4]))
    }

    /// Same corners with every coordinate multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            id: self.id,
            corners: self.corners.map(|p| Point2::from(p.coords * factor)),
        }
    }
}

/// Unit vector from the centroid of `from` to the centroid of `to`.
pub fn direction_between(
    from: &MarkerObservation,
    to: &MarkerObservation,
) -> Result<Unit<Vector2<f64>>, GeometryError> {
    let delta = to.centroid() - from.centroid();
    Unit::try_new(delta, GEOMETRY_EPS).ok_or(GeometryError::CoincidentCentroids)
}

/// Pair of pixel points a method measured between.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportSegment {
    pub from: PixelPoint,
    pub to: PixelPoint,
}

impl SupportSegment {
    pub fn new(from: PixelPoint, to: PixelPoint) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn length_px(&self) -> f64 {
        nalgebra::distance(&self.from, &self.to)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            from: Point2::from(self.from.coords * factor),
            to: Point2::from(self.to.coords * factor),
        }
    }
}

/// Pixel dimensions of the frame the corners were detected in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> PixelPoint {
        Point2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// `width + height`, the normalizer of the perspective heuristic.
    pub fn extent(&self) -> Result<f64, GeometryError> {
        if self.width == 0 && self.height == 0 {
            return Err(GeometryError::InvalidFrame {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.width as f64 + self.height as f64)
    }
}
