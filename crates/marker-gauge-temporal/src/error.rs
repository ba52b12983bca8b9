/// Errors returned by [`crate::TemporalFilter::ingest`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TemporalError {
    #[error("timestamp did not advance ({now}s, newest sample at {newest}s)")]
    TimestampRegression { newest: f64, now: f64 },
    #[error("timestamp is not a finite number ({now})")]
    NonFiniteTimestamp { now: f64 },
    #[error("sample is not a finite number ({value})")]
    NonFiniteSample { value: f64 },
}
