//! Small robust-statistics helpers over `f64` slices.
//!
//! All functions return `None` for an empty input rather than `NaN`.

/// Median; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median absolute deviation around `center`.
pub fn median_abs_deviation(values: &[f64], center: f64) -> Option<f64> {
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Median and MAD in one pass over the caller's data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RobustSpread {
    pub median: f64,
    pub mad: f64,
}

impl RobustSpread {
    pub fn of(values: &[f64]) -> Option<Self> {
        let median = median(values)?;
        let mad = median_abs_deviation(values, median)?;
        Some(Self { median, mad })
    }

    /// True if `value` lies within `factor * mad` of the median (inclusive).
    #[inline]
    pub fn is_inlier(&self, value: f64, factor: f64) -> bool {
        (value - self.median).abs() <= factor * self.mad
    }
}
