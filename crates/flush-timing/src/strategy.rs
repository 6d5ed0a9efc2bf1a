use std::time::Duration;

use derive_more::Display;

/// Mean inter-arrival interval below which telemetry is flushed at the start
/// of the invocation. Roughly "more often than once every two minutes";
/// tunable, calibrated against observed invocation patterns.
pub const DEFAULT_FREQUENCY_THRESHOLD: Duration = Duration::from_secs(120);

/// Point in the invocation lifecycle at which buffered telemetry is flushed.
///
/// `AtStart` pays added latency before the handler runs but survives an
/// execution environment that is frozen or reclaimed right after the
/// invocation. `AtEnd` is the default: it adds no pre-handler latency and is
/// safe when invocations are infrequent enough to leave idle time afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum FlushTiming {
    /// Flush before the handler runs.
    #[display("at_start")]
    AtStart,
    /// Flush after the handler returns.
    #[default]
    #[display("at_end")]
    AtEnd,
}

impl FlushTiming {
    /// Stable identifier, suitable for logs and wire formats.
    pub fn name(self) -> &'static str {
        match self {
            Self::AtStart => "at_start",
            Self::AtEnd => "at_end",
        }
    }
}

/// Map a frequency estimate to a flush timing.
///
/// An undetermined estimate selects `AtEnd`: without knowing the call pattern
/// we avoid adding pre-handler latency. Estimates below `threshold` mean the
/// function is invoked frequently and the environment may be reclaimed quickly,
/// so flush at the start; estimates at or above it leave ample idle time after
/// the handler, so flush at the end.
pub fn select(estimate: Option<Duration>, threshold: Duration) -> FlushTiming {
    match estimate {
        Some(interval) if interval < threshold => FlushTiming::AtStart,
        Some(_) | None => FlushTiming::AtEnd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undetermined_estimate_selects_at_end() {
        assert_eq!(
            select(None, DEFAULT_FREQUENCY_THRESHOLD),
            FlushTiming::AtEnd,
            "unknown call pattern should select the conservative default"
        );
    }

    #[test]
    fn frequent_invocations_select_at_start() {
        assert_eq!(
            select(Some(Duration::from_secs(1)), DEFAULT_FREQUENCY_THRESHOLD),
            FlushTiming::AtStart
        );
        assert_eq!(
            select(
                Some(DEFAULT_FREQUENCY_THRESHOLD - Duration::from_millis(1)),
                DEFAULT_FREQUENCY_THRESHOLD
            ),
            FlushTiming::AtStart,
            "estimates just below the threshold should select at_start"
        );
    }

    #[test]
    fn infrequent_invocations_select_at_end() {
        assert_eq!(
            select(Some(DEFAULT_FREQUENCY_THRESHOLD), DEFAULT_FREQUENCY_THRESHOLD),
            FlushTiming::AtEnd,
            "an estimate equal to the threshold should select at_end"
        );
        assert_eq!(
            select(Some(Duration::from_secs(300)), DEFAULT_FREQUENCY_THRESHOLD),
            FlushTiming::AtEnd
        );
    }

    #[test]
    fn selection_is_pure() {
        let estimate = Some(Duration::from_secs(30));
        let first = select(estimate, DEFAULT_FREQUENCY_THRESHOLD);
        for _ in 0..10 {
            assert_eq!(
                select(estimate, DEFAULT_FREQUENCY_THRESHOLD),
                first,
                "identical inputs should always yield identical decisions"
            );
        }
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(FlushTiming::AtStart.name(), "at_start");
        assert_eq!(FlushTiming::AtEnd.name(), "at_end");
        assert_eq!(FlushTiming::AtStart.to_string(), "at_start");
        assert_eq!(FlushTiming::AtEnd.to_string(), "at_end");
    }

    #[test]
    fn default_is_at_end() {
        assert_eq!(FlushTiming::default(), FlushTiming::AtEnd);
    }
}
