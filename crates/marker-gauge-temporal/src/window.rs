use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One observed distance and the time it was taken.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemporalSample {
    pub distance_m: f64,
    /// Seconds on the caller's monotonic clock.
    pub timestamp: f64,
}

/// Time-ordered samples, bounded by count and by age.
///
/// Oldest samples sit at the front. The window never reorders: callers must
/// push strictly increasing, finite timestamps, which
/// [`crate::TemporalFilter`] enforces.
#[derive(Clone, Debug, Default)]
pub struct MeasurementWindow {
    samples: VecDeque<TemporalSample>,
    capacity: usize,
    max_age_s: f64,
}

impl MeasurementWindow {
    pub fn new(capacity: usize, max_age_s: f64) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            max_age_s,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_age_s(&self) -> f64 {
        self.max_age_s
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn newest(&self) -> Option<&TemporalSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemporalSample> {
        self.samples.iter()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.distance_m).collect()
    }

    /// Drop every sample with `now - timestamp > max_age_s`.
    ///
    /// Returns the number of evicted samples.
    pub fn evict_expired(&mut self, now: f64) -> usize {
        let before = self.samples.len();
        while let Some(front) = self.samples.front() {
            if now - front.timestamp > self.max_age_s {
                self.samples.pop_front();
            } else {
                break;
            }
        }
        before - self.samples.len()
    }

    /// Expire old samples, append `sample`, then trim to capacity.
    pub fn push(&mut self, sample: TemporalSample) {
        self.evict_expired(sample.timestamp);
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }
}
