use crate::{
    CentroidEstimator, DistanceEstimate, DistanceEstimator, EdgeEstimator, EstimationMethod,
    MultiPointEstimator, MultiPointParams, PerspectiveEstimator, PerspectiveParams,
};
use marker_gauge_core::stats::{mean, population_std_dev};
use marker_gauge_core::{FrameSize, GeometryError, MarkerObservation, Scale};
use serde::{Deserialize, Serialize};

/// An ordered list of estimators run on the same marker pair.
///
/// Estimators share nothing mutable, so the order only affects the order of
/// the resulting [`EstimateSet`].
pub struct EstimatorSet {
    estimators: Vec<Box<dyn DistanceEstimator>>,
}

impl EstimatorSet {
    pub fn new(estimators: Vec<Box<dyn DistanceEstimator>>) -> Self {
        Self { estimators }
    }

    /// The four built-in estimators, in [`EstimationMethod::ALL`] order.
    pub fn standard(
        frame: FrameSize,
        multi_point: MultiPointParams,
        perspective: PerspectiveParams,
    ) -> Self {
        Self::new(vec![
            Box::new(CentroidEstimator),
            Box::new(EdgeEstimator),
            Box::new(MultiPointEstimator::new(multi_point)),
            Box::new(PerspectiveEstimator::new(frame, perspective)),
        ])
    }

    pub fn methods(&self) -> impl Iterator<Item = EstimationMethod> + '_ {
        self.estimators.iter().map(|e| e.method())
    }

    /// Run every estimator; the first failure aborts the run.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(first = first.id, second = second.id))
    )]
    pub fn run(
        &self,
        first: &MarkerObservation,
        second: &MarkerObservation,
        scale: &Scale,
    ) -> Result<EstimateSet, GeometryError> {
        let estimates = self
            .estimators
            .iter()
            .map(|e| e.estimate(first, second, scale))
            .collect::<Result<Vec<_>, _>>()?;
        for e in &estimates {
            log::debug!("{:>12}: {:.4} m", e.method, e.value_m);
        }
        Ok(EstimateSet { estimates })
    }
}

/// Results of one [`EstimatorSet::run`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateSet {
    estimates: Vec<DistanceEstimate>,
}

impl EstimateSet {
    pub fn from_estimates(estimates: Vec<DistanceEstimate>) -> Self {
        Self { estimates }
    }

    pub fn get(&self, method: EstimationMethod) -> Option<&DistanceEstimate> {
        self.estimates.iter().find(|e| e.method == method)
    }

    pub fn value(&self, method: EstimationMethod) -> Option<f64> {
        self.get(method).map(|e| e.value_m)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistanceEstimate> {
        self.estimates.iter()
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.estimates.iter().map(|e| e.value_m).collect()
    }

    /// Agreement across methods: `1 - stddev / mean`, or `0.5` if the mean is
    /// not positive.
    pub fn consistency(&self) -> f64 {
        let values = self.values();
        match (mean(&values), population_std_dev(&values)) {
            (Some(m), Some(sd)) if m > 0.0 => 1.0 - sd / m,
            _ => 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn estimate(method: EstimationMethod, value_m: f64) -> DistanceEstimate {
        DistanceEstimate {
            method,
            value_m,
            support: Vec::new(),
        }
    }

    #[test]
    fn standard_set_runs_all_four_methods() {
        let a = MarkerObservation::from_xy(
            0,
            [[100.0, 100.0], [150.0, 100.0], [150.0, 150.0], [100.0, 150.0]],
        );
        let b = MarkerObservation::from_xy(
            1,
            [[400.0, 100.0], [450.0, 100.0], [450.0, 150.0], [400.0, 150.0]],
        );
        let scale = Scale::from_side(0.05, 50.0).expect("scale");
        let set = EstimatorSet::standard(
            FrameSize::new(640, 480),
            MultiPointParams::default(),
            PerspectiveParams::default(),
        );
        assert_eq!(set.methods().collect::<Vec<_>>(), EstimationMethod::ALL);

        let out = set.run(&a, &b, &scale).expect("run");
        assert_eq!(out.len(), 4);
        assert_relative_eq!(
            out.value(EstimationMethod::Centroid).expect("centroid"),
            0.3,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            out.value(EstimationMethod::Edge).expect("edge"),
            0.25,
            epsilon = 1e-12
        );
    }

    #[test]
    fn identical_values_are_fully_consistent() {
        let set = EstimateSet::from_estimates(
            EstimationMethod::ALL
                .iter()
                .map(|&m| estimate(m, 0.4))
                .collect(),
        );
        assert_relative_eq!(set.consistency(), 1.0);
    }

    #[test]
    fn zero_mean_falls_back_to_half() {
        let set = EstimateSet::from_estimates(vec![estimate(EstimationMethod::Edge, 0.0)]);
        assert_eq!(set.consistency(), 0.5);
        assert_eq!(EstimateSet::from_estimates(Vec::new()).consistency(), 0.5);
    }
}
