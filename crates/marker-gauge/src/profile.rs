//! Detection presets.
//!
//! A profile only changes how markers are found and how the overlay is
//! encoded; the measurement math is identical under both.

use crate::ProfileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionProfile {
    /// Downscaled input, light sub-pixel refinement.
    #[default]
    Fast,
    /// Full-resolution input, thorough sub-pixel refinement.
    Precise,
}

impl DetectionProfile {
    pub const ALL: [DetectionProfile; 2] = [DetectionProfile::Fast, DetectionProfile::Precise];

    pub fn as_str(self) -> &'static str {
        match self {
            DetectionProfile::Fast => "fast",
            DetectionProfile::Precise => "precise",
        }
    }
}

impl fmt::Display for DetectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DetectionProfile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(DetectionProfile::Fast),
            "precise" => Ok(DetectionProfile::Precise),
            _ => Err(ProfileError { name: s.to_owned() }),
        }
    }
}

/// Iterative refinement stop criteria: window half-size, iteration cap and
/// minimum step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefineCriteria {
    pub window: u32,
    pub max_iterations: u32,
    pub accuracy: f64,
}

/// ArUco tuning shared by both profiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArucoTuning {
    pub dictionary: String,
    pub adaptive_thresh_win_min: u32,
    pub adaptive_thresh_win_max: u32,
    pub adaptive_thresh_win_step: u32,
    pub adaptive_thresh_constant: f64,
    pub min_marker_perimeter_rate: f64,
    pub max_marker_perimeter_rate: f64,
    pub min_corner_distance_rate: f64,
    pub min_distance_to_border: u32,
    pub min_otsu_std_dev: f64,
    pub perspective_remove_pixel_per_cell: u32,
    pub perspective_remove_ignored_margin_per_cell: f64,
    pub max_erroneous_bits_in_border_rate: f64,
}

impl Default for ArucoTuning {
    fn default() -> Self {
        Self {
            dictionary: "4x4_50".to_owned(),
            adaptive_thresh_win_min: 3,
            adaptive_thresh_win_max: 23,
            adaptive_thresh_win_step: 10,
            adaptive_thresh_constant: 7.0,
            min_marker_perimeter_rate: 0.03,
            max_marker_perimeter_rate: 4.0,
            min_corner_distance_rate: 0.05,
            min_distance_to_border: 3,
            min_otsu_std_dev: 5.0,
            perspective_remove_pixel_per_cell: 4,
            perspective_remove_ignored_margin_per_cell: 0.13,
            max_erroneous_bits_in_border_rate: 0.35,
        }
    }
}

/// Everything a [`crate::MarkerDetector`] is told about the active profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub profile: DetectionProfile,
    /// Shrink frames larger than `max_width x max_height` before detection.
    pub downscale: bool,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
    pub polygonal_approx_accuracy: f64,
    pub corner_refinement: RefineCriteria,
    pub subpixel: RefineCriteria,
    pub aruco: ArucoTuning,
}

impl DetectionConfig {
    pub fn for_profile(profile: DetectionProfile) -> Self {
        match profile {
            DetectionProfile::Fast => Self {
                profile,
                downscale: true,
                max_width: 800,
                max_height: 600,
                jpeg_quality: 80,
                polygonal_approx_accuracy: 0.03,
                corner_refinement: RefineCriteria {
                    window: 3,
                    max_iterations: 10,
                    accuracy: 0.02,
                },
                subpixel: RefineCriteria {
                    window: 3,
                    max_iterations: 15,
                    accuracy: 1e-3,
                },
                aruco: ArucoTuning::default(),
            },
            DetectionProfile::Precise => Self {
                profile,
                downscale: false,
                max_width: 1920,
                max_height: 1080,
                jpeg_quality: 95,
                polygonal_approx_accuracy: 0.02,
                corner_refinement: RefineCriteria {
                    window: 5,
                    max_iterations: 30,
                    accuracy: 0.01,
                },
                subpixel: RefineCriteria {
                    window: 5,
                    max_iterations: 100,
                    accuracy: 1e-5,
                },
                aruco: ArucoTuning::default(),
            },
        }
    }

    /// Bounds to shrink to, or `None` if this profile keeps full resolution.
    pub fn downscale_bounds(&self) -> Option<(u32, u32)> {
        self.downscale.then_some((self.max_width, self.max_height))
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self::for_profile(DetectionProfile::default())
    }
}
