use std::time::Duration;

use crate::history::InvocationHistory;

/// Minimum number of samples required before an estimate is produced.
pub const MIN_SAMPLES: usize = 3;

/// Mean inter-arrival interval across the retained history window.
///
/// Returns `None` with fewer than [`MIN_SAMPLES`] entries; callers must treat
/// that as "undetermined" rather than a zero-length interval. With n >= 3
/// entries the estimate is `(newest - oldest) / (n - 1)`, which is O(1) on an
/// already-sorted buffer and exact for evenly spaced input.
pub fn mean_interval(history: &InvocationHistory) -> Option<Duration> {
    let n = history.len();
    if n < MIN_SAMPLES {
        return None;
    }
    let newest = history.newest()?;
    let oldest = history.oldest()?;
    // The history is sorted, so newest >= oldest always holds.
    let span = newest.duration_since(oldest).unwrap_or_default();
    Some(span / (n - 1) as u32)
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use similar_asserts::assert_eq;

    use super::*;

    fn evenly_spaced(count: u64, spacing: Duration) -> InvocationHistory {
        let now = SystemTime::now();
        let mut history = InvocationHistory::new();
        for i in (0..count).rev() {
            history.record(now - spacing * i as u32);
        }
        history
    }

    #[test]
    fn undetermined_below_three_samples() {
        let now = SystemTime::now();
        let mut history = InvocationHistory::new();

        assert_eq!(mean_interval(&history), None, "empty history");

        history.record(now - Duration::from_secs(2));
        assert_eq!(mean_interval(&history), None, "one sample");

        history.record(now - Duration::from_secs(1));
        assert_eq!(mean_interval(&history), None, "two samples");

        history.record(now);
        assert!(
            mean_interval(&history).is_some(),
            "three samples should produce an estimate"
        );
    }

    #[test]
    fn exact_for_one_second_spacing() {
        let history = evenly_spaced(100, Duration::from_secs(1));

        assert_eq!(history.len(), 50, "history should be trimmed to capacity");
        assert_eq!(
            mean_interval(&history),
            Some(Duration::from_secs(1)),
            "50 samples spaced 1s apart should estimate exactly 1s"
        );
    }

    #[test]
    fn exact_for_ten_millisecond_spacing() {
        let history = evenly_spaced(100, Duration::from_millis(10));

        assert_eq!(history.len(), 50, "history should be trimmed to capacity");
        assert_eq!(
            mean_interval(&history),
            Some(Duration::from_millis(10)),
            "50 samples spaced 10ms apart should estimate exactly 10ms"
        );
    }

    #[test]
    fn spanning_average_for_uneven_spacing() {
        let now = SystemTime::now();
        let mut history = InvocationHistory::new();
        history.record(now - Duration::from_secs(140));
        history.record(now - Duration::from_secs(70));
        history.record(now - Duration::from_secs(1));

        assert_eq!(
            mean_interval(&history),
            Some(Duration::from_millis(69_500)),
            "estimate should be (newest - oldest) / (n - 1)"
        );
    }
}
