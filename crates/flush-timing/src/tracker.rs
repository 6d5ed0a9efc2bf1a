use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use error_stack::Report;

use crate::error::TrackerError;
use crate::estimator;
use crate::history::{InvocationHistory, DEFAULT_HISTORY_CAPACITY};
use crate::strategy::{self, FlushTiming, DEFAULT_FREQUENCY_THRESHOLD};
use crate::Result;

/// Tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Maximum number of invocation timestamps retained.
    pub capacity: usize,
    /// Mean inter-arrival interval below which telemetry is flushed at the
    /// start of the invocation.
    pub frequency_threshold: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            frequency_threshold: DEFAULT_FREQUENCY_THRESHOLD,
        }
    }
}

struct TrackerState {
    history: InvocationHistory,
    selected: FlushTiming,
}

/// Thread-safe invocation tracker selecting a flush timing per invocation.
///
/// History and the active selection live behind a single mutex so concurrent
/// readers always observe a completed update. The lock is held only for the
/// O(capacity) in-memory operation, never across I/O, so an outstanding flush
/// can never stall history recording.
pub struct InvocationTracker {
    state: Mutex<TrackerState>,
    frequency_threshold: Duration,
}

impl Default for InvocationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationTracker {
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default()).expect("default config is valid")
    }

    /// Build a tracker from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfiguration`] when the capacity is
    /// zero or the threshold is a zero duration.
    pub fn with_config(config: TrackerConfig) -> Result<Self, TrackerError> {
        if config.capacity == 0 {
            return Err(Report::new(TrackerError::invalid_config(
                "history capacity must be at least 1",
            )));
        }
        if config.frequency_threshold.is_zero() {
            return Err(Report::new(TrackerError::invalid_config(
                "frequency threshold must be a positive duration",
            )));
        }
        Ok(Self {
            state: Mutex::new(TrackerState {
                history: InvocationHistory::with_capacity(config.capacity),
                selected: FlushTiming::default(),
            }),
            frequency_threshold: config.frequency_threshold,
        })
    }

    /// Record an invocation arrival time.
    ///
    /// Returns `false` when the timestamp is earlier than the newest recorded
    /// entry; such timestamps are dropped.
    pub fn record_invocation(&self, at: SystemTime) -> bool {
        self.state.lock().expect("poisoned").history.record(at)
    }

    /// Mean inter-arrival interval over the retained window, or `None` while
    /// there is not enough data to tell.
    pub fn invocation_frequency(&self) -> Option<Duration> {
        estimator::mean_interval(&self.state.lock().expect("poisoned").history)
    }

    /// Recompute the flush timing from the current history snapshot and store
    /// it as the active selection for this invocation.
    pub fn auto_select_strategy(&self) -> FlushTiming {
        let mut state = self.state.lock().expect("poisoned");
        let estimate = estimator::mean_interval(&state.history);
        let timing = strategy::select(estimate, self.frequency_threshold);
        if timing != state.selected {
            tracing::debug!(
                from = state.selected.name(),
                to = timing.name(),
                estimate = ?estimate,
                "switching flush strategy"
            );
        }
        state.selected = timing;
        timing
    }

    /// The timing selected at the most recent invocation start.
    pub fn selected_strategy(&self) -> FlushTiming {
        self.state.lock().expect("poisoned").selected
    }

    /// Number of retained invocation timestamps.
    pub fn invocation_count(&self) -> usize {
        self.state.lock().expect("poisoned").history.len()
    }

    /// Drop all recorded history and fall back to the default selection.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("poisoned");
        state.history.clear();
        state.selected = FlushTiming::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn defaults_to_at_end_without_data() {
        let tracker = InvocationTracker::new();
        assert_eq!(
            tracker.auto_select_strategy(),
            FlushTiming::AtEnd,
            "empty history should select the default strategy"
        );
    }

    #[test_log::test]
    fn switches_to_at_start_for_frequent_invocations() {
        let tracker = InvocationTracker::new();
        let now = SystemTime::now();

        assert!(tracker.record_invocation(now - Duration::from_secs(140)));
        assert_eq!(
            tracker.auto_select_strategy(),
            FlushTiming::AtEnd,
            "one sample is not enough data"
        );
        assert!(tracker.record_invocation(now - Duration::from_secs(70)));
        assert_eq!(
            tracker.auto_select_strategy(),
            FlushTiming::AtEnd,
            "two samples are not enough data"
        );

        // Third invocation: the function runs more often than the threshold.
        assert!(tracker.record_invocation(now - Duration::from_secs(1)));
        assert_eq!(
            tracker.auto_select_strategy(),
            FlushTiming::AtStart,
            "frequent invocations should flush at the start"
        );
    }

    #[test_log::test]
    fn keeps_at_end_for_infrequent_invocations() {
        let tracker = InvocationTracker::new();
        let now = SystemTime::now();

        assert!(tracker.record_invocation(now - Duration::from_secs(16 * 60)));
        assert_eq!(tracker.auto_select_strategy(), FlushTiming::AtEnd);
        assert!(tracker.record_invocation(now - Duration::from_secs(10 * 60)));
        assert_eq!(tracker.auto_select_strategy(), FlushTiming::AtEnd);
        assert!(tracker.record_invocation(now - Duration::from_secs(6 * 60)));
        assert_eq!(
            tracker.auto_select_strategy(),
            FlushTiming::AtEnd,
            "a five minute mean interval should keep flushing at the end"
        );
    }

    #[test_log::test]
    fn reset_returns_to_the_default_strategy() {
        let tracker = InvocationTracker::new();
        let now = SystemTime::now();

        for i in (0..5u64).rev() {
            tracker.record_invocation(now - Duration::from_secs(i));
        }
        assert_eq!(tracker.auto_select_strategy(), FlushTiming::AtStart);

        tracker.reset();

        assert_eq!(tracker.invocation_count(), 0, "history should be empty");
        assert_eq!(
            tracker.auto_select_strategy(),
            FlushTiming::AtEnd,
            "reset should fall back to the default strategy"
        );
    }

    #[test_log::test]
    fn selection_is_stable_for_an_unmodified_history() {
        let tracker = InvocationTracker::new();
        let now = SystemTime::now();
        for i in (0..10u64).rev() {
            tracker.record_invocation(now - Duration::from_secs(i * 30));
        }

        let first = tracker.auto_select_strategy();
        for _ in 0..10 {
            assert_eq!(
                tracker.auto_select_strategy(),
                first,
                "repeated selection against an unmodified history should not change"
            );
        }
    }

    #[test]
    fn history_is_trimmed_to_capacity() {
        let tracker = InvocationTracker::new();
        let now = SystemTime::now();

        for i in (1..=100u64).rev() {
            tracker.record_invocation(now - Duration::from_secs(i));
        }

        assert_eq!(tracker.invocation_count(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(
            tracker.invocation_frequency(),
            Some(Duration::from_secs(1)),
            "one invocation per second over the retained window"
        );
    }

    #[test]
    fn rejects_zero_capacity() {
        let result = InvocationTracker::with_config(TrackerConfig {
            capacity: 0,
            ..TrackerConfig::default()
        });
        assert!(result.is_err(), "zero capacity should be rejected");
    }

    #[test]
    fn rejects_zero_threshold() {
        let result = InvocationTracker::with_config(TrackerConfig {
            frequency_threshold: Duration::ZERO,
            ..TrackerConfig::default()
        });
        assert!(result.is_err(), "zero threshold should be rejected");
    }
}
