//! Translates runtime lifecycle notifications into tracker updates and
//! flushes.

use std::sync::Arc;
use std::time::SystemTime;

use flush_timing::FlushTiming;
use flush_timing::InvocationTracker;

use crate::flush::FlushExecutor;

pub struct LifecycleProcessor {
    tracker: Arc<InvocationTracker>,
    executor: Arc<FlushExecutor>,
}

impl LifecycleProcessor {
    pub fn new(tracker: Arc<InvocationTracker>, executor: Arc<FlushExecutor>) -> Self {
        Self { tracker, executor }
    }

    /// Handle an invocation start notification.
    ///
    /// Records the arrival time, recomputes the flush strategy from the
    /// current history, and for `AtStart` awaits a flush so buffered
    /// telemetry is out before the handler runs. The tracker lock is never
    /// held across the flush, so a slow sink cannot stall later recordings.
    pub async fn invocation_started(&self, at: SystemTime) -> FlushTiming {
        if !self.tracker.record_invocation(at) {
            tracing::warn!("dropping out-of-order invocation timestamp");
        }

        let timing = self.tracker.auto_select_strategy();
        tracing::debug!(
            strategy = timing.name(),
            invocations = self.tracker.invocation_count(),
            "invocation started"
        );

        if timing == FlushTiming::AtStart {
            if let Err(e) = self.executor.flush(timing).await {
                tracing::error!("pre-handler flush failed: {e:?}");
            }
        }
        timing
    }

    /// Handle an invocation end notification.
    ///
    /// When the strategy selected at this invocation's start was `AtEnd`,
    /// spawns the flush; nothing waits on a post-handler flush.
    pub fn invocation_ended(&self) {
        if self.tracker.selected_strategy() != FlushTiming::AtEnd {
            return;
        }
        let executor = self.executor.clone();
        tokio::spawn(async move {
            if let Err(e) = executor.flush(FlushTiming::AtEnd).await {
                tracing::error!("post-handler flush failed: {e:?}");
            }
        });
    }
}
