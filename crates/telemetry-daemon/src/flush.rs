//! Telemetry buffering and flush execution.
//!
//! The buffer holds opaque payloads received from the function library; the
//! executor drains it and hands the batch to a [`FlushSink`] under a deadline.
//! Payload transport belongs to the sink implementation, not to this daemon.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use derive_more::Display;
use error_stack::Report;
use flush_timing::FlushTiming;
use flush_timing::Result;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

/// Errors raised while flushing buffered telemetry.
#[derive(Debug, Display)]
pub enum FlushError {
    /// The sink rejected or failed the submission.
    #[display("telemetry submission failed: {reason}")]
    SubmissionFailed { reason: String },
    /// The submission did not complete within the deadline.
    #[display("flush timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },
}

impl core::error::Error for FlushError {}

impl FlushError {
    pub fn submission(reason: impl Into<String>) -> Self {
        Self::SubmissionFailed {
            reason: reason.into(),
        }
    }
}

/// One buffered telemetry payload, opaque to the daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord(pub serde_json::Value);

/// Mutex-guarded queue of telemetry payloads awaiting submission.
#[derive(Debug, Default)]
pub struct TelemetryBuffer {
    records: Mutex<Vec<TelemetryRecord>>,
}

impl TelemetryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: TelemetryRecord) {
        self.records.lock().expect("poisoned").push(record);
    }

    /// Take every buffered record, leaving the buffer empty.
    pub fn drain(&self) -> Vec<TelemetryRecord> {
        std::mem::take(&mut *self.records.lock().expect("poisoned"))
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().expect("poisoned").is_empty()
    }
}

/// Transmission seam for drained telemetry batches.
///
/// Returns a boxed future so the trait stays object-safe; implementations own
/// the actual transport.
pub trait FlushSink: Send + Sync {
    fn name(&self) -> &'static str;

    fn submit(&self, batch: Vec<TelemetryRecord>) -> BoxFuture<'_, Result<(), FlushError>>;
}

/// Sink that logs batch sizes instead of transmitting them. Deployments plug
/// in a real exporter behind [`FlushSink`].
pub struct LoggingSink;

impl FlushSink for LoggingSink {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn submit(&self, batch: Vec<TelemetryRecord>) -> BoxFuture<'_, Result<(), FlushError>> {
        Box::pin(async move {
            tracing::info!(records = batch.len(), "submitting telemetry batch");
            Ok(())
        })
    }
}

/// Drains the buffer and submits batches under a deadline.
pub struct FlushExecutor {
    buffer: Arc<TelemetryBuffer>,
    sink: Arc<dyn FlushSink>,
    timeout: Duration,
}

impl FlushExecutor {
    pub fn new(buffer: Arc<TelemetryBuffer>, sink: Arc<dyn FlushSink>, timeout: Duration) -> Self {
        Self {
            buffer,
            sink,
            timeout,
        }
    }

    /// Whether any telemetry is waiting to be flushed.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Flush everything currently buffered.
    ///
    /// The buffer is drained before submission, so new payloads arriving while
    /// a flush is in progress land in the next batch.
    ///
    /// # Errors
    ///
    /// - [`FlushError::SubmissionFailed`] if the sink fails
    /// - [`FlushError::TimedOut`] if the sink misses the deadline
    pub async fn flush(&self, timing: FlushTiming) -> Result<(), FlushError> {
        let batch = self.buffer.drain();
        if batch.is_empty() {
            tracing::trace!(timing = timing.name(), "nothing to flush");
            return Ok(());
        }

        let count = batch.len();
        match tokio::time::timeout(self.timeout, self.sink.submit(batch)).await {
            Ok(Ok(())) => {
                tracing::debug!(
                    records = count,
                    timing = timing.name(),
                    sink = self.sink.name(),
                    "flushed telemetry"
                );
                Ok(())
            }
            Ok(Err(report)) => Err(report),
            Err(_) => Err(Report::new(FlushError::TimedOut {
                timeout_ms: self.timeout.as_millis() as u64,
            })),
        }
    }
}

/// Safety-net task flushing buffered telemetry during idle stretches.
pub struct PeriodicFlusher {
    executor: Arc<FlushExecutor>,
    tracker: Arc<flush_timing::InvocationTracker>,
}

impl PeriodicFlusher {
    pub fn new(
        executor: Arc<FlushExecutor>,
        tracker: Arc<flush_timing::InvocationTracker>,
    ) -> Self {
        Self { executor, tracker }
    }

    pub async fn run(&self, interval: Duration, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if !self.executor.has_pending() {
                        continue;
                    }
                    let timing = self.tracker.selected_strategy();
                    if let Err(e) = self.executor.flush(timing).await {
                        tracing::error!("periodic flush failed: {e:?}");
                    }
                }
                _ = token.cancelled() => {
                    tracing::info!("periodic flusher cancelled");
                    break;
                }
            }
        }
    }
}
