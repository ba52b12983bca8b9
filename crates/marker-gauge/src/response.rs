//! Request and response shapes at the service boundary.

use crate::{ErrorKind, FinalMeasurement, MeasureError, PairwiseDifference, SelectedMethod};
use marker_gauge_estimators::EstimationMethod;
use marker_gauge_temporal::FilterState;
use serde::{Deserialize, Serialize};

fn default_side_length_m() -> f64 {
    0.05
}

fn default_visualize() -> bool {
    true
}

/// One frame to measure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasureRequest {
    /// Encoded image (PNG, JPEG, ...).
    pub image: Vec<u8>,
    #[serde(default = "default_side_length_m")]
    pub side_length_m: f64,
    #[serde(default = "default_visualize")]
    pub visualize: bool,
}

impl MeasureRequest {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            side_length_m: default_side_length_m(),
            visualize: default_visualize(),
        }
    }

    pub fn with_side_length(mut self, side_length_m: f64) -> Self {
        self.side_length_m = side_length_m;
        self
    }

    pub fn with_visualization(mut self, visualize: bool) -> Self {
        self.visualize = visualize;
        self
    }
}

/// Round to `places` decimal digits.
pub fn round_to(value: f64, places: i32) -> f64 {
    let k = 10f64.powi(places);
    (value * k).round() / k
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseDiagnostics {
    pub centroid_m: f64,
    pub edge_m: f64,
    pub multi_point_m: f64,
    pub perspective_m: f64,
    pub filtered_m: f64,
    pub filter_state: FilterState,
    pub method_consistency: f64,
    pub pairwise_differences: Vec<PairwiseDifference>,
    pub inliers: usize,
    pub outliers: usize,
    pub window_len: usize,
    pub detected_ids: Vec<u32>,
}

/// A successful measurement, rounded for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasureResponse {
    /// Meters, 3 decimals.
    pub distance_m: f64,
    /// Square meters, 2 decimals.
    pub area_m2: f64,
    /// Length of the reported support segments in the measured frame.
    pub pixel_distance: f64,
    pub meters_per_pixel: f64,
    pub side_length_m: f64,
    /// 2 decimals.
    pub confidence: f64,
    pub method: SelectedMethod,
    pub diagnostics: ResponseDiagnostics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Vec<u8>>,
}

impl MeasureResponse {
    pub fn from_measurement(measurement: &FinalMeasurement, visualization: Option<Vec<u8>>) -> Self {
        let d = &measurement.diagnostics;
        let value = |method| measurement.estimates.value(method).unwrap_or(0.0);
        Self {
            distance_m: round_to(measurement.distance_m, 3),
            area_m2: round_to(measurement.area_m2, 2),
            pixel_distance: round_to(d.pixel_distance, 2),
            meters_per_pixel: d.calibration.scale.meters_per_pixel(),
            side_length_m: d.calibration.scale.real_side_m(),
            confidence: round_to(measurement.confidence, 2),
            method: measurement.method,
            diagnostics: ResponseDiagnostics {
                centroid_m: round_to(value(EstimationMethod::Centroid), 4),
                edge_m: round_to(value(EstimationMethod::Edge), 4),
                multi_point_m: round_to(value(EstimationMethod::MultiPoint), 4),
                perspective_m: round_to(value(EstimationMethod::Perspective), 4),
                filtered_m: round_to(d.filtered.value_m, 4),
                filter_state: d.filtered.state,
                method_consistency: round_to(d.agreement.consistency, 3),
                pairwise_differences: d
                    .agreement
                    .pairwise
                    .iter()
                    .map(|p| PairwiseDifference {
                        difference_m: round_to(p.difference_m, 4),
                        ..p.clone()
                    })
                    .collect(),
                inliers: d.filtered.inliers,
                outliers: d.filtered.outliers,
                window_len: d.filtered.window_len,
                detected_ids: d.detected_ids.clone(),
            },
            visualization,
        }
    }
}

/// What the boundary sends back for every request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceReply {
    Ok(Box<MeasureResponse>),
    Error { kind: ErrorKind, message: String },
}

impl ServiceReply {
    pub fn from_result(result: Result<MeasureResponse, MeasureError>) -> Self {
        match result {
            Ok(response) => ServiceReply::Ok(Box::new(response)),
            Err(err) => {
                log::warn!("request failed ({}): {err}", err.kind());
                ServiceReply::Error {
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ServiceReply::Ok(_))
    }
}
