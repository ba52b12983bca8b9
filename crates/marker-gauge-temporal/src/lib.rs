//! Temporal smoothing of a stream of distance measurements.
//!
//! A [`TemporalFilter`] owns one bounded, time-limited [`MeasurementWindow`]
//! and turns each new observation into a smoothed value with a confidence
//! score. Windows belong to a measurement session: [`SessionRegistry`] keeps
//! one filter per session id so unrelated clients never mix samples.
//!
//! Timestamps are plain `f64` seconds on any monotonic clock chosen by the
//! caller.

mod error;
mod filter;
mod params;
mod session;
mod window;

pub use error::TemporalError;
pub use filter::{FilterState, FilteredResult, TemporalFilter};
pub use params::TemporalFilterParams;
pub use session::{SessionHandle, SessionRegistry};
pub use window::{MeasurementWindow, TemporalSample};
