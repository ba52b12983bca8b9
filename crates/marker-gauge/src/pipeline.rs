use crate::{
    ArbiterThresholds, GaugeConfig, MeasureError, MethodAgreement, MethodArbiter, SelectedMethod,
};
use marker_gauge_core::{FrameSize, GeometryError, MarkerObservation, SupportSegment};
use marker_gauge_estimators::{
    Calibration, CalibrationParams, EstimateSet, EstimationMethod, EstimatorSet, MultiPointParams,
    PerspectiveParams, ScaleCalibrator,
};
use marker_gauge_temporal::{FilteredResult, TemporalFilter};
use serde::{Deserialize, Serialize};

/// Everything behind a [`FinalMeasurement`], kept for reporting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Every detected id, ascending.
    pub detected_ids: Vec<u32>,
    /// The two markers measured, lowest id first.
    pub markers: [MarkerObservation; 2],
    pub calibration: Calibration,
    pub filtered: FilteredResult,
    pub agreement: MethodAgreement,
    /// Segments of the estimator that illustrates the reported value.
    pub support: Vec<SupportSegment>,
    /// Mean length of `support`, in pixels of the measured frame.
    pub pixel_distance: f64,
}

/// The outcome of one request. Built once, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalMeasurement {
    pub distance_m: f64,
    /// Square of the temporally filtered distance, assuming a square
    /// footprint. Differs from `distance_m` squared when the arbiter picks
    /// another method.
    pub area_m2: f64,
    pub method: SelectedMethod,
    pub confidence: f64,
    pub estimates: EstimateSet,
    pub diagnostics: Diagnostics,
}

/// Sort by id and take the two lowest.
pub fn select_pair(
    observations: &[MarkerObservation],
) -> Result<(Vec<u32>, [MarkerObservation; 2]), MeasureError> {
    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|m| m.id);
    let ids = sorted.iter().map(|m| m.id).collect();
    let mut it = sorted.into_iter();
    match (it.next(), it.next()) {
        (Some(first), Some(second)) => Ok((ids, [first, second])),
        _ => Err(MeasureError::InsufficientMarkers {
            found: observations.len(),
        }),
    }
}

/// Stateless per-request orchestration; the temporal state is passed in.
#[derive(Clone, Debug, Default)]
pub struct MeasurementPipeline {
    calibrator: ScaleCalibrator,
    multi_point: MultiPointParams,
    perspective: PerspectiveParams,
    arbiter: MethodArbiter,
}

impl MeasurementPipeline {
    pub fn new(
        calibration: CalibrationParams,
        multi_point: MultiPointParams,
        perspective: PerspectiveParams,
        thresholds: ArbiterThresholds,
    ) -> Self {
        Self {
            calibrator: ScaleCalibrator::new(calibration),
            multi_point,
            perspective,
            arbiter: MethodArbiter::new(thresholds),
        }
    }

    pub fn from_config(config: &GaugeConfig) -> Self {
        Self::new(
            config.calibration.clone(),
            config.multi_point.clone(),
            config.perspective.clone(),
            config.arbiter.clone(),
        )
    }

    pub fn arbiter(&self) -> &MethodArbiter {
        &self.arbiter
    }

    /// Measure the distance between the two lowest-id markers.
    ///
    /// `frame` is the size of the image the corners live in. On error the
    /// temporal filter is untouched unless the failure came from the filter
    /// itself.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "info",
            skip(self, observations, filter),
            fields(markers = observations.len())
        )
    )]
    pub fn measure(
        &self,
        observations: &[MarkerObservation],
        real_side_m: f64,
        frame: FrameSize,
        filter: &mut TemporalFilter,
        now: f64,
    ) -> Result<FinalMeasurement, MeasureError> {
        if !(real_side_m.is_finite() && real_side_m > 0.0) {
            return Err(GeometryError::NonPositiveSideLength {
                meters: real_side_m,
            }
            .into());
        }
        let (detected_ids, [first, second]) = select_pair(observations)?;

        let calibration = self.calibrator.calibrate(&first, real_side_m)?;
        let estimators =
            EstimatorSet::standard(frame, self.multi_point.clone(), self.perspective.clone());
        let estimates = estimators.run(&first, &second, &calibration.scale)?;

        let multi_point = estimates
            .value(EstimationMethod::MultiPoint)
            .ok_or(MeasureError::MissingEstimate(EstimationMethod::MultiPoint))?;
        let filtered = filter.ingest(multi_point, now)?;

        let outcome = self.arbiter.arbitrate(&estimates, &filtered)?;

        let support = estimates
            .get(outcome.method.support_method())
            .map(|e| e.support.clone())
            .unwrap_or_default();
        let pixel_distance = if support.is_empty() {
            0.0
        } else {
            support.iter().map(SupportSegment::length_px).sum::<f64>() / support.len() as f64
        };

        log::info!(
            "markers {}+{}: {:.3} m via {} (confidence {:.2})",
            first.id,
            second.id,
            outcome.value_m,
            outcome.method,
            filtered.confidence
        );

        Ok(FinalMeasurement {
            distance_m: outcome.value_m,
            area_m2: filtered.value_m * filtered.value_m,
            method: outcome.method,
            confidence: filtered.confidence,
            estimates,
            diagnostics: Diagnostics {
                detected_ids,
                markers: [first, second],
                calibration,
                filtered,
                agreement: outcome.agreement,
                support,
                pixel_distance,
            },
        })
    }
}
