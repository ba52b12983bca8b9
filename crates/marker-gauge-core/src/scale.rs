use crate::{GeometryError, GEOMETRY_EPS};
use serde::{Deserialize, Serialize};

/// Pixel-to-meter conversion derived from a marker of known size.
///
/// Invariant: `meters_per_pixel > 0`. The only constructor enforces it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    meters_per_pixel: f64,
    side_px: f64,
    real_side_m: f64,
}

impl Scale {
    /// Derive the scale from a real side length and its robust pixel length.
    pub fn from_side(real_side_m: f64, side_px: f64) -> Result<Self, GeometryError> {
        if !(real_side_m.is_finite() && real_side_m > 0.0) {
            return Err(GeometryError::NonPositiveSideLength {
                meters: real_side_m,
            });
        }
        if !side_px.is_finite() || side_px <= GEOMETRY_EPS {
            return Err(GeometryError::DegenerateMarker { side_px });
        }
        Ok(Self {
            meters_per_pixel: real_side_m / side_px,
            side_px,
            real_side_m,
        })
    }

    #[inline]
    pub fn meters_per_pixel(&self) -> f64 {
        self.meters_per_pixel
    }

    /// Pixel side length the scale was derived from.
    #[inline]
    pub fn side_px(&self) -> f64 {
        self.side_px
    }

    #[inline]
    pub fn real_side_m(&self) -> f64 {
        self.real_side_m
    }

    #[inline]
    pub fn to_meters(&self, pixels: f64) -> f64 {
        pixels * self.meters_per_pixel
    }
}
