use approx::assert_relative_eq;
use marker_gauge_temporal::{
    FilterState, SessionRegistry, TemporalError, TemporalFilter, TemporalFilterParams,
};

#[test]
fn noisy_stream_with_one_glitch() {
    let mut filter = TemporalFilter::default();
    let readings = [1.0, 1.2, 0.8, 1.1, 0.9, 5.0, 1.0, 1.05];
    let mut results = Vec::new();
    for (i, d) in readings.iter().enumerate() {
        results.push(filter.ingest(*d, i as f64 * 0.1).unwrap());
    }

    assert!(results[..2].iter().all(|r| r.state == FilterState::WarmingUp));
    let glitch = &results[5];
    assert_eq!(glitch.outliers, 1);
    let last = results.last().unwrap();
    assert_eq!(last.window_len, 8);
    assert_eq!(last.outliers, 1);
    assert!(last.confidence > 0.8 && last.confidence < 0.95);
    // the glitch is still averaged in
    assert!(last.value_m > 1.1);
}

#[test]
fn gap_longer_than_age_limit_restarts_the_window() {
    let mut filter = TemporalFilter::default();
    for i in 0..6 {
        filter.ingest(2.0, i as f64 * 0.1).unwrap();
    }
    let after_gap = filter.ingest(2.5, 5.0).unwrap();
    assert_eq!(after_gap.window_len, 1);
    assert_eq!(after_gap.confidence, 0.5);
    assert_eq!(after_gap.value_m, 2.5);
}

#[test]
fn custom_params_flow_through_registry() {
    let params = TemporalFilterParams {
        capacity: 3,
        min_samples: 2,
        ..TemporalFilterParams::default()
    };
    let registry = SessionRegistry::new(params);
    registry.ingest("a", 1.0, 0.0).unwrap();
    let second = registry.ingest("a", 1.0, 0.1).unwrap();
    assert_eq!(second.state, FilterState::Smoothed);
    assert_relative_eq!(second.confidence, 2.0 / 5.0, epsilon = 1e-12);
    for i in 2..6 {
        registry.ingest("a", 1.0, i as f64 * 0.1).unwrap();
    }
    let handle = registry.session("a");
    assert_eq!(handle.lock().unwrap().window().len(), 3);
}

#[test]
fn out_of_order_timestamp_is_reported() {
    let registry = SessionRegistry::default();
    registry.ingest("cam", 1.0, 3.0).unwrap();
    let err = registry.ingest("cam", 1.0, 2.0).unwrap_err();
    assert!(matches!(err, TemporalError::TimestampRegression { .. }));
    // a repeated timestamp does not advance the clock either
    assert!(matches!(
        registry.ingest("cam", 1.0, 3.0),
        Err(TemporalError::TimestampRegression { .. })
    ));
    assert!(registry.ingest("cam", 1.0, 3.1).is_ok());
}

#[test]
fn params_load_from_partial_json() {
    let params: TemporalFilterParams =
        serde_json::from_str(r#"{"capacity": 4, "max_age_s": 0.5}"#).unwrap();
    assert_eq!(params.capacity, 4);
    assert_eq!(params.max_age_s, 0.5);
    assert_eq!(params.min_samples, TemporalFilterParams::default().min_samples);
}

#[test]
fn filtered_result_serializes_state_in_snake_case() {
    let mut filter = TemporalFilter::default();
    let result = filter.ingest(1.0, 0.0).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["state"], "warming_up");
    assert_eq!(json["window_len"], 1);
}
