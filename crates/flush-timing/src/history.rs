use std::collections::VecDeque;
use std::time::SystemTime;

/// Maximum number of invocation timestamps retained by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded, time-ordered record of recent invocation arrival times.
///
/// Entries are non-decreasing and capped at the configured capacity; once the
/// buffer is full, recording a new arrival evicts the oldest entry. Backed by a
/// `VecDeque` pre-allocated at capacity, so eviction is O(1) and the buffer
/// never reallocates.
#[derive(Debug, Clone)]
pub struct InvocationHistory {
    entries: VecDeque<SystemTime>,
    capacity: usize,
}

impl Default for InvocationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an invocation arrival time, evicting the oldest entry when full.
    ///
    /// Returns `false` if `at` is earlier than the newest stored entry; such
    /// timestamps are rejected to keep the sequence sorted. Monotonically
    /// non-decreasing input is the supported case.
    pub fn record(&mut self, at: SystemTime) -> bool {
        if let Some(&newest) = self.entries.back() {
            if at < newest {
                return false;
            }
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(at);
        true
    }

    /// Earliest retained arrival time.
    pub fn oldest(&self) -> Option<SystemTime> {
        self.entries.front().copied()
    }

    /// Latest retained arrival time.
    pub fn newest(&self) -> Option<SystemTime> {
        self.entries.back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemTime> {
        self.entries.iter()
    }
}
