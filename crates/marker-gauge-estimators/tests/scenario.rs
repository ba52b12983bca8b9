use approx::assert_relative_eq;
use marker_gauge_core::{FrameSize, GeometryError, MarkerObservation};
use marker_gauge_estimators::{
    CalibrationParams, EdgeEstimator, EstimationMethod, EstimatorSet, MultiPointEstimator,
    MultiPointParams, PerspectiveParams, ScaleCalibrator,
};
use nalgebra::Point2;

fn scenario() -> (MarkerObservation, MarkerObservation) {
    (
        MarkerObservation::from_xy(
            1,
            [[100.0, 100.0], [150.0, 100.0], [150.0, 150.0], [100.0, 150.0]],
        ),
        MarkerObservation::from_xy(
            2,
            [[400.0, 100.0], [450.0, 100.0], [450.0, 150.0], [400.0, 150.0]],
        ),
    )
}

#[test]
fn reference_scenario_end_to_end() {
    let (first, second) = scenario();
    let calibration = ScaleCalibrator::new(CalibrationParams::default())
        .calibrate(&first, 0.05)
        .unwrap();
    assert_relative_eq!(calibration.scale.meters_per_pixel(), 0.001, epsilon = 1e-15);
    assert_eq!(calibration.kept_sides, 4);

    let edges = EdgeEstimator
        .estimate_edges(&first, &second, &calibration.scale)
        .unwrap();
    assert_eq!(edges.edge1, Point2::new(150.0, 100.0));
    assert_eq!(edges.edge2, Point2::new(400.0, 100.0));
    assert_relative_eq!(edges.value_m, 0.25, epsilon = 1e-12);

    let set = EstimatorSet::standard(
        FrameSize::new(640, 480),
        MultiPointParams::default(),
        PerspectiveParams::default(),
    );
    let estimates = set.run(&first, &second, &calibration.scale).unwrap();
    assert_eq!(estimates.len(), 4);
    assert_relative_eq!(
        estimates.value(EstimationMethod::Centroid).unwrap(),
        0.3,
        epsilon = 1e-12
    );
    let perspective = estimates.value(EstimationMethod::Perspective).unwrap();
    assert!(perspective < 0.3 && perspective > 0.29);

    let multi = MultiPointEstimator::new(MultiPointParams::default())
        .estimate_pairs(&first, &second, &calibration.scale)
        .unwrap();
    assert_relative_eq!(multi.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(multi.centroid_distance_m, 0.3, epsilon = 1e-12);
    assert_eq!(
        estimates.value(EstimationMethod::MultiPoint),
        Some(multi.value_m)
    );
}

#[test]
fn coincident_centroids_fail_every_directional_estimator() {
    let (first, _) = scenario();
    let scale = ScaleCalibrator::default().calibrate(&first, 0.05).unwrap().scale;
    let copy = MarkerObservation { id: 2, ..first.clone() };

    assert_eq!(
        EdgeEstimator.estimate_edges(&first, &copy, &scale).unwrap_err(),
        GeometryError::CoincidentCentroids
    );
    assert_eq!(
        MultiPointEstimator::default()
            .estimate_pairs(&first, &copy, &scale)
            .unwrap_err(),
        GeometryError::CoincidentCentroids
    );
    let set = EstimatorSet::standard(
        FrameSize::new(640, 480),
        MultiPointParams::default(),
        PerspectiveParams::default(),
    );
    assert!(set.run(&first, &copy, &scale).is_err());
}

#[test]
fn method_tags_match_their_wire_names() {
    for method in EstimationMethod::ALL {
        let json = serde_json::to_value(method).unwrap();
        assert_eq!(json, method.as_str());
        let back: EstimationMethod = serde_json::from_value(json).unwrap();
        assert_eq!(back, method);
    }
}

#[test]
fn params_missing_from_json_use_defaults() {
    let multi: MultiPointParams = serde_json::from_str("{}").unwrap();
    assert_eq!(multi, MultiPointParams::default());
    let cal: CalibrationParams = serde_json::from_str(r#"{"outlier_mad_factor": 3.0}"#).unwrap();
    assert_eq!(cal.outlier_mad_factor, 3.0);
}
