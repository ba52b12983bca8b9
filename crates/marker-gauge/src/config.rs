//! JSON configuration for a measurement service.

use crate::{ArbiterThresholds, ConfigIoError, DetectionProfile};
use marker_gauge_estimators::{CalibrationParams, MultiPointParams, PerspectiveParams};
use marker_gauge_temporal::TemporalFilterParams;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

fn default_side_length_m() -> f64 {
    0.05
}

fn default_visualize() -> bool {
    true
}

/// Service-wide settings. Every field is optional in the JSON form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Detection profile at startup; can be changed at runtime.
    #[serde(default)]
    pub profile: DetectionProfile,
    /// Marker side length used when a request does not give one.
    #[serde(default = "default_side_length_m")]
    pub side_length_m: f64,
    /// Whether requests render an overlay unless they opt out.
    #[serde(default = "default_visualize")]
    pub visualize: bool,
    #[serde(default)]
    pub calibration: CalibrationParams,
    #[serde(default)]
    pub multi_point: MultiPointParams,
    #[serde(default)]
    pub perspective: PerspectiveParams,
    #[serde(default)]
    pub temporal: TemporalFilterParams,
    #[serde(default)]
    pub arbiter: ArbiterThresholds,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            profile: DetectionProfile::default(),
            side_length_m: default_side_length_m(),
            visualize: default_visualize(),
            calibration: CalibrationParams::default(),
            multi_point: MultiPointParams::default(),
            perspective: PerspectiveParams::default(),
            temporal: TemporalFilterParams::default(),
            arbiter: ArbiterThresholds::default(),
        }
    }
}

impl GaugeConfig {
    /// Load a JSON config from disk and [`validate`](Self::validate) it.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject lengths and time constants that would divide by zero.
    pub fn validate(&self) -> Result<(), ConfigIoError> {
        let positive = [
            ("side_length_m", self.side_length_m),
            ("multi_point.smoothing_rel", self.multi_point.smoothing_rel),
            ("temporal.max_age_s", self.temporal.max_age_s),
            ("temporal.recency_tau_s", self.temporal.recency_tau_s),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigIoError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
