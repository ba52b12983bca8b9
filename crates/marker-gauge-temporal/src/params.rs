use serde::{Deserialize, Serialize};

/// Configuration for [`crate::TemporalFilter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalFilterParams {
    /// Maximum number of samples kept in the window.
    pub capacity: usize,
    /// Samples strictly older than this (seconds) are evicted on ingest.
    pub max_age_s: f64,
    /// Below this many samples the raw value is returned unsmoothed.
    pub min_samples: usize,
    /// Confidence reported while warming up.
    pub warmup_confidence: f64,
    /// Samples farther than `outlier_mad_factor * MAD` from the median do not
    /// count towards confidence.
    pub outlier_mad_factor: f64,
    /// Confidence reported when every sample is an outlier.
    pub all_outliers_confidence: f64,
    /// Time constant (seconds) of the exponential recency weight.
    pub recency_tau_s: f64,
    /// Inlier count at which the sample factor saturates at 1.
    pub full_confidence_samples: usize,
    /// Consistency used when the inlier median is not positive.
    pub fallback_consistency: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl Default for TemporalFilterParams {
    fn default() -> Self {
        Self {
            capacity: 10,
            max_age_s: 2.0,
            min_samples: 3,
            warmup_confidence: 0.5,
            outlier_mad_factor: 2.5,
            all_outliers_confidence: 0.3,
            recency_tau_s: 2.0,
            full_confidence_samples: 5,
            fallback_consistency: 0.5,
            min_confidence: 0.1,
            max_confidence: 1.0,
        }
    }
}
