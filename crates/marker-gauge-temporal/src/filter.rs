use crate::{MeasurementWindow, TemporalError, TemporalFilterParams, TemporalSample};
use marker_gauge_core::stats::{median, population_std_dev, RobustSpread};
use serde::{Deserialize, Serialize};

/// Which branch of the filter produced a [`FilteredResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterState {
    /// Too few samples; the raw input was passed through.
    WarmingUp,
    /// No sample survived the MAD test; the window median was reported.
    AllOutliers,
    /// Recency-weighted mean over the whole window.
    Smoothed,
}

/// Output of one [`TemporalFilter::ingest`] call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilteredResult {
    pub value_m: f64,
    pub confidence: f64,
    pub inliers: usize,
    pub outliers: usize,
    pub window_len: usize,
    pub state: FilterState,
}

/// Sliding-window smoother for one measurement session.
#[derive(Clone, Debug)]
pub struct TemporalFilter {
    params: TemporalFilterParams,
    window: MeasurementWindow,
}

impl Default for TemporalFilter {
    fn default() -> Self {
        Self::new(TemporalFilterParams::default())
    }
}

impl TemporalFilter {
    pub fn new(params: TemporalFilterParams) -> Self {
        let window = MeasurementWindow::new(params.capacity, params.max_age_s);
        Self { params, window }
    }

    pub fn params(&self) -> &TemporalFilterParams {
        &self.params
    }

    pub fn window(&self) -> &MeasurementWindow {
        &self.window
    }

    /// Add `distance_m` observed at `now` and recompute the smoothed value.
    ///
    /// Outliers are excluded from the confidence only; the smoothed value
    /// always averages every sample still in the window.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(window = self.window.len()))
    )]
    pub fn ingest(&mut self, distance_m: f64, now: f64) -> Result<FilteredResult, TemporalError> {
        if !distance_m.is_finite() {
            return Err(TemporalError::NonFiniteSample { value: distance_m });
        }
        if !now.is_finite() {
            return Err(TemporalError::NonFiniteTimestamp { now });
        }
        if let Some(newest) = self.window.newest() {
            if now <= newest.timestamp {
                return Err(TemporalError::TimestampRegression {
                    newest: newest.timestamp,
                    now,
                });
            }
        }

        self.window.push(TemporalSample {
            distance_m,
            timestamp: now,
        });
        let window_len = self.window.len();

        if window_len < self.params.min_samples {
            return Ok(FilteredResult {
                value_m: distance_m,
                confidence: self.params.warmup_confidence,
                inliers: window_len,
                outliers: 0,
                window_len,
                state: FilterState::WarmingUp,
            });
        }

        let distances = self.window.distances();
        let Some(spread) = RobustSpread::of(&distances) else {
            // push above guarantees a non-empty window
            return Ok(FilteredResult {
                value_m: distance_m,
                confidence: self.params.warmup_confidence,
                inliers: 0,
                outliers: 0,
                window_len,
                state: FilterState::WarmingUp,
            });
        };

        let inliers: Vec<f64> = distances
            .iter()
            .copied()
            .filter(|&d| spread.is_inlier(d, self.params.outlier_mad_factor))
            .collect();
        let outliers = window_len - inliers.len();

        if inliers.is_empty() {
            log::debug!(
                "temporal: all {window_len} samples rejected, reporting median {:.4}",
                spread.median
            );
            return Ok(FilteredResult {
                value_m: spread.median,
                confidence: self.params.all_outliers_confidence,
                inliers: 0,
                outliers,
                window_len,
                state: FilterState::AllOutliers,
            });
        }

        let value_m = self.recency_weighted_mean(now);
        let consistency = self.consistency(&inliers);
        let sample_factor =
            (inliers.len() as f64 / self.params.full_confidence_samples.max(1) as f64).min(1.0);
        let confidence = (consistency * sample_factor)
            .clamp(self.params.min_confidence, self.params.max_confidence);

        log::debug!(
            "temporal: {:.4} m, confidence {:.3} ({} inliers, {} outliers)",
            value_m,
            confidence,
            inliers.len(),
            outliers
        );

        Ok(FilteredResult {
            value_m,
            confidence,
            inliers: inliers.len(),
            outliers,
            window_len,
            state: FilterState::Smoothed,
        })
    }

    fn recency_weighted_mean(&self, now: f64) -> f64 {
        let tau = self.params.recency_tau_s;
        let (weighted, total) = self
            .window
            .iter()
            .map(|s| {
                let w = (-(now - s.timestamp) / tau).exp();
                (w * s.distance_m, w)
            })
            .fold((0.0, 0.0), |(acc_v, acc_w), (v, w)| (acc_v + v, acc_w + w));
        if total > 0.0 {
            weighted / total
        } else {
            median(&self.window.distances()).unwrap_or(0.0)
        }
    }

    fn consistency(&self, inliers: &[f64]) -> f64 {
        match (median(inliers), population_std_dev(inliers)) {
            (Some(m), Some(sd)) if m > 0.0 => 1.0 - sd / m,
            _ => self.params.fallback_consistency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_two_samples_are_passed_through() {
        let mut filter = TemporalFilter::default();
        let a = filter.ingest(1.0, 0.0).unwrap();
        let b = filter.ingest(1.2, 0.1).unwrap();
        assert_eq!(a.value_m, 1.0);
        assert_eq!(a.confidence, 0.5);
        assert_eq!(b.value_m, 1.2);
        assert_eq!(b.confidence, 0.5);
        assert_eq!(b.state, FilterState::WarmingUp);
    }

    #[test]
    fn constant_stream_converges_to_full_confidence() {
        let mut filter = TemporalFilter::default();
        let mut last = None;
        for i in 0..6 {
            last = Some(filter.ingest(0.75, i as f64 * 0.1).unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.state, FilterState::Smoothed);
        assert_relative_eq!(last.value_m, 0.75, epsilon = 1e-12);
        assert_relative_eq!(last.confidence, 1.0, epsilon = 1e-12);
        assert_eq!(last.inliers, 6);
        assert_eq!(last.outliers, 0);
    }

    #[test]
    fn three_constant_samples_scale_confidence_by_sample_count() {
        let mut filter = TemporalFilter::default();
        filter.ingest(2.0, 0.0).unwrap();
        filter.ingest(2.0, 0.1).unwrap();
        let r = filter.ingest(2.0, 0.2).unwrap();
        assert_relative_eq!(r.confidence, 3.0 / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn outlier_is_averaged_but_not_counted() {
        let mut filter = TemporalFilter::default();
        for (i, d) in [1.0, 1.01, 0.99, 1.0, 5.0].iter().enumerate() {
            filter.ingest(*d, i as f64 * 0.1).unwrap();
        }
        let r = filter.ingest(1.0, 0.5).unwrap();
        assert_eq!(r.outliers, 1);
        assert_eq!(r.inliers, 5);
        // 5.0 still pulls the weighted mean above 1
        assert!(r.value_m > 1.5);
        assert!(r.confidence > 0.95);
    }

    #[test]
    fn recency_weights_favor_newer_samples() {
        let mut filter = TemporalFilter::default();
        filter.ingest(1.0, 0.0).unwrap();
        filter.ingest(1.0, 0.1).unwrap();
        let r = filter.ingest(2.0, 1.9).unwrap();
        // three samples, newest has the largest weight
        let w_old = (-(1.9f64) / 2.0).exp();
        let w_mid = (-(1.8f64) / 2.0).exp();
        let expected = (w_old + w_mid + 2.0) / (w_old + w_mid + 1.0);
        assert_relative_eq!(r.value_m, expected, epsilon = 1e-12);
    }

    #[test]
    fn stale_samples_restart_warm_up() {
        let mut filter = TemporalFilter::default();
        for i in 0..5 {
            filter.ingest(1.0, i as f64 * 0.1).unwrap();
        }
        let r = filter.ingest(3.0, 10.0).unwrap();
        assert_eq!(r.window_len, 1);
        assert_eq!(r.state, FilterState::WarmingUp);
        assert_eq!(r.value_m, 3.0);
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut filter = TemporalFilter::default();
        for i in 0..25 {
            let r = filter.ingest(1.0, i as f64 * 0.01).unwrap();
            assert!(r.window_len <= 10);
        }
        assert_eq!(filter.window().len(), 10);
    }

    #[test]
    fn every_sample_rejected_reports_median() {
        let params = TemporalFilterParams {
            outlier_mad_factor: -1.0,
            ..TemporalFilterParams::default()
        };
        let mut filter = TemporalFilter::new(params);
        filter.ingest(1.0, 0.0).unwrap();
        filter.ingest(2.0, 0.1).unwrap();
        let r = filter.ingest(4.0, 0.2).unwrap();
        assert_eq!(r.state, FilterState::AllOutliers);
        assert_eq!(r.value_m, 2.0);
        assert_eq!(r.confidence, 0.3);
        assert_eq!(r.outliers, 3);
    }

    #[test]
    fn confidence_stays_within_bounds() {
        let mut filter = TemporalFilter::default();
        filter.ingest(0.01, 0.0).unwrap();
        filter.ingest(10.0, 0.1).unwrap();
        let r = filter.ingest(0.02, 0.2).unwrap();
        assert!(r.confidence >= 0.1);
        assert!(r.confidence <= 1.0);
    }

    #[test]
    fn backwards_timestamp_is_rejected_without_mutation() {
        let mut filter = TemporalFilter::default();
        filter.ingest(1.0, 1.0).unwrap();
        let err = filter.ingest(1.0, 0.5).unwrap_err();
        assert_eq!(
            err,
            TemporalError::TimestampRegression {
                newest: 1.0,
                now: 0.5
            }
        );
        assert_eq!(filter.window().len(), 1);
    }

    #[test]
    fn non_finite_sample_is_rejected() {
        let mut filter = TemporalFilter::default();
        assert!(matches!(
            filter.ingest(f64::NAN, 0.0),
            Err(TemporalError::NonFiniteSample { .. })
        ));
        assert!(filter.window().is_empty());
    }

    #[test]
    fn repeated_timestamp_is_rejected() {
        let mut filter = TemporalFilter::default();
        filter.ingest(1.0, 1.0).unwrap();
        assert!(matches!(
            filter.ingest(1.0, 1.0),
            Err(TemporalError::TimestampRegression { .. })
        ));
        assert_eq!(filter.window().len(), 1);
    }

    #[test]
    fn non_finite_timestamp_never_enters_the_window() {
        let mut filter = TemporalFilter::default();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                filter.ingest(1.0, bad),
                Err(TemporalError::NonFiniteTimestamp { .. })
            ));
        }
        assert!(filter.window().is_empty());

        // age eviction and later ingests keep working
        filter.ingest(1.0, 0.0).unwrap();
        let r = filter.ingest(2.0, 100.0).unwrap();
        assert_eq!(r.window_len, 1);
        assert_eq!(filter.window().newest().map(|s| s.timestamp), Some(100.0));
    }
}
