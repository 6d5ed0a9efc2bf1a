//! Adaptive flush-timing selection for serverless telemetry daemons.
//!
//! This crate provides three main components:
//! - [`InvocationHistory`]: Bounded, time-ordered record of invocation arrivals
//! - [`FlushTiming`]: The two flush-timing policies (flush before or after the handler)
//! - [`InvocationTracker`]: Thread-safe tracker that picks a policy per invocation
//!
//! A serverless execution environment may be frozen or reclaimed right after an
//! invocation completes, so buffered telemetry sometimes has to go out *before*
//! the handler runs. The tracker estimates how often the function is invoked
//! and selects the timing policy accordingly: frequent invocations flush at the
//! start, infrequent ones flush at the end.

use error_stack::Report;

mod error;
mod estimator;
mod history;
mod strategy;
mod tracker;

/// Result type using error-stack for context-rich error reporting
pub type Result<T, C> = core::result::Result<T, Report<C>>;

pub use error::TrackerError;
pub use estimator::{mean_interval, MIN_SAMPLES};
pub use history::{InvocationHistory, DEFAULT_HISTORY_CAPACITY};
pub use strategy::{select, FlushTiming, DEFAULT_FREQUENCY_THRESHOLD};
pub use tracker::{InvocationTracker, TrackerConfig};
