//! Selection of the single distance that gets reported.
//!
//! The rule table is a pure function of two numbers: the temporal filter's
//! confidence and the agreement between the four per-frame estimators.
//! Nothing here holds state.

use crate::MeasureError;
use marker_gauge_core::stats::{mean, population_std_dev};
use marker_gauge_estimators::{EstimateSet, EstimationMethod};
use marker_gauge_temporal::FilteredResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The reported value's origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectedMethod {
    TemporalFilter,
    MultiPoint,
    Perspective,
    Edge,
}

impl SelectedMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectedMethod::TemporalFilter => "temporal_filter",
            SelectedMethod::MultiPoint => "multi_point",
            SelectedMethod::Perspective => "perspective",
            SelectedMethod::Edge => "edge",
        }
    }

    /// Estimator whose support segments illustrate this selection.
    ///
    /// The filtered value is fed by the multi-point estimator, so it borrows
    /// that estimator's segments.
    pub fn support_method(self) -> EstimationMethod {
        match self {
            SelectedMethod::TemporalFilter | SelectedMethod::MultiPoint => {
                EstimationMethod::MultiPoint
            }
            SelectedMethod::Perspective => EstimationMethod::Perspective,
            SelectedMethod::Edge => EstimationMethod::Edge,
        }
    }
}

impl fmt::Display for SelectedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Rule-table thresholds. All comparisons are strict (`>`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterThresholds {
    pub filtered_min_confidence: f64,
    pub filtered_min_consistency: f64,
    pub multi_point_min_confidence: f64,
    pub multi_point_min_consistency: f64,
    pub perspective_min_consistency: f64,
}

impl Default for ArbiterThresholds {
    fn default() -> Self {
        Self {
            filtered_min_confidence: 0.8,
            filtered_min_consistency: 0.9,
            multi_point_min_confidence: 0.6,
            multi_point_min_consistency: 0.7,
            perspective_min_consistency: 0.5,
        }
    }
}

/// First matching row of the rule table wins; [`SelectedMethod::Edge`] is the
/// fallback.
pub fn select_method(
    thresholds: &ArbiterThresholds,
    confidence: f64,
    consistency: f64,
) -> SelectedMethod {
    if confidence > thresholds.filtered_min_confidence
        && consistency > thresholds.filtered_min_consistency
    {
        SelectedMethod::TemporalFilter
    } else if confidence > thresholds.multi_point_min_confidence
        && consistency > thresholds.multi_point_min_consistency
    {
        SelectedMethod::MultiPoint
    } else if consistency > thresholds.perspective_min_consistency {
        SelectedMethod::Perspective
    } else {
        SelectedMethod::Edge
    }
}

/// `|a - b|` for one pair of estimators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairwiseDifference {
    pub first: EstimationMethod,
    pub second: EstimationMethod,
    pub difference_m: f64,
}

/// Spread of the per-frame estimates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodAgreement {
    pub mean_m: f64,
    pub std_dev_m: f64,
    pub consistency: f64,
    pub pairwise: Vec<PairwiseDifference>,
}

impl MethodAgreement {
    pub fn of(estimates: &EstimateSet) -> Self {
        let values = estimates.values();
        let all: Vec<_> = estimates.iter().collect();
        let mut pairwise = Vec::with_capacity(all.len() * all.len().saturating_sub(1) / 2);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                pairwise.push(PairwiseDifference {
                    first: a.method,
                    second: b.method,
                    difference_m: (a.value_m - b.value_m).abs(),
                });
            }
        }
        Self {
            mean_m: mean(&values).unwrap_or(0.0),
            std_dev_m: population_std_dev(&values).unwrap_or(0.0),
            consistency: estimates.consistency(),
            pairwise,
        }
    }
}

/// The arbiter's decision and the evidence behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArbiterOutcome {
    pub method: SelectedMethod,
    pub value_m: f64,
    pub agreement: MethodAgreement,
}

#[derive(Clone, Debug, Default)]
pub struct MethodArbiter {
    thresholds: ArbiterThresholds,
}

impl MethodArbiter {
    pub fn new(thresholds: ArbiterThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ArbiterThresholds {
        &self.thresholds
    }

    /// Pick a value from `estimates` or `filtered`.
    ///
    /// Fails only if `estimates` lacks the estimator the rule table selected.
    pub fn arbitrate(
        &self,
        estimates: &EstimateSet,
        filtered: &FilteredResult,
    ) -> Result<ArbiterOutcome, MeasureError> {
        let agreement = MethodAgreement::of(estimates);
        let method = select_method(&self.thresholds, filtered.confidence, agreement.consistency);
        let value_m = match method {
            SelectedMethod::TemporalFilter => filtered.value_m,
            other => {
                let wanted = other.support_method();
                estimates
                    .value(wanted)
                    .ok_or(MeasureError::MissingEstimate(wanted))?
            }
        };
        log::debug!(
            "arbiter: confidence {:.3}, consistency {:.3} -> {} ({:.4} m)",
            filtered.confidence,
            agreement.consistency,
            method,
            value_m
        );
        Ok(ArbiterOutcome {
            method,
            value_m,
            agreement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use marker_gauge_estimators::DistanceEstimate;
    use marker_gauge_temporal::FilterState;

    fn set(values: [f64; 4]) -> EstimateSet {
        EstimateSet::from_estimates(
            EstimationMethod::ALL
                .iter()
                .zip(values)
                .map(|(&method, value_m)| DistanceEstimate {
                    method,
                    value_m,
                    support: Vec::new(),
                })
                .collect(),
        )
    }

    fn filtered(value_m: f64, confidence: f64) -> FilteredResult {
        FilteredResult {
            value_m,
            confidence,
            inliers: 5,
            outliers: 0,
            window_len: 5,
            state: FilterState::Smoothed,
        }
    }

    #[test]
    fn rule_table_rows() {
        let t = ArbiterThresholds::default();
        assert_eq!(select_method(&t, 0.9, 0.95), SelectedMethod::TemporalFilter);
        assert_eq!(select_method(&t, 0.9, 0.85), SelectedMethod::MultiPoint);
        assert_eq!(select_method(&t, 0.7, 0.95), SelectedMethod::MultiPoint);
        assert_eq!(select_method(&t, 0.5, 0.95), SelectedMethod::Perspective);
        assert_eq!(select_method(&t, 0.1, 0.6), SelectedMethod::Perspective);
        assert_eq!(select_method(&t, 1.0, 0.5), SelectedMethod::Edge);
    }

    #[test]
    fn thresholds_are_strict() {
        let t = ArbiterThresholds::default();
        assert_eq!(select_method(&t, 0.8, 0.95), SelectedMethod::MultiPoint);
        assert_eq!(select_method(&t, 0.6, 0.75), SelectedMethod::Perspective);
    }

    #[test]
    fn selection_is_pure() {
        let t = ArbiterThresholds::default();
        for _ in 0..3 {
            assert_eq!(select_method(&t, 0.65, 0.72), SelectedMethod::MultiPoint);
        }
    }

    #[test]
    fn agreeing_estimates_with_high_confidence_report_filtered_value() {
        let arbiter = MethodArbiter::default();
        let outcome = arbiter
            .arbitrate(&set([1.0, 1.0, 1.0, 1.0]), &filtered(1.02, 0.95))
            .unwrap();
        assert_eq!(outcome.method, SelectedMethod::TemporalFilter);
        assert_eq!(outcome.value_m, 1.02);
        assert_relative_eq!(outcome.agreement.consistency, 1.0);
    }

    #[test]
    fn scattered_estimates_fall_back_to_edge() {
        let arbiter = MethodArbiter::default();
        let outcome = arbiter
            .arbitrate(&set([0.1, 0.2, 2.0, 3.0]), &filtered(1.0, 0.95))
            .unwrap();
        assert_eq!(outcome.method, SelectedMethod::Edge);
        assert_eq!(outcome.value_m, 0.2);
    }

    #[test]
    fn missing_estimator_is_reported() {
        let partial = EstimateSet::from_estimates(vec![DistanceEstimate {
            method: EstimationMethod::Centroid,
            value_m: 1.0,
            support: Vec::new(),
        }]);
        let err = MethodArbiter::default()
            .arbitrate(&partial, &filtered(1.0, 0.1))
            .unwrap_err();
        assert!(matches!(
            err,
            MeasureError::MissingEstimate(EstimationMethod::Perspective)
        ));
    }

    #[test]
    fn pairwise_differences_cover_every_pair() {
        let agreement = MethodAgreement::of(&set([0.3, 0.25, 0.26, 0.29]));
        assert_eq!(agreement.pairwise.len(), 6);
        let centroid_edge = &agreement.pairwise[0];
        assert_eq!(centroid_edge.first, EstimationMethod::Centroid);
        assert_eq!(centroid_edge.second, EstimationMethod::Edge);
        assert_relative_eq!(centroid_edge.difference_m, 0.05, epsilon = 1e-12);
        assert_relative_eq!(agreement.mean_m, 0.275, epsilon = 1e-12);
    }
}
