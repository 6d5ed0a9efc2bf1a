use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use poem::handler;
use poem::web::Data;
use poem::web::Json;
use poem::web::Query;
use tracing::info;

use super::types::AckResponse;
use super::types::StartQuery;
use crate::flush::TelemetryBuffer;
use crate::flush::TelemetryRecord;
use crate::lifecycle::LifecycleProcessor;

/// Resolve the invocation arrival time from an optional client timestamp.
///
/// A timestamp ahead of the daemon clock is clamped to the arrival time:
/// recording it would make every later genuine arrival look out-of-order and
/// get dropped.
fn arrival_time(timestamp_ms: Option<u64>, now: SystemTime) -> SystemTime {
    match timestamp_ms {
        Some(ms) => {
            let requested = UNIX_EPOCH + Duration::from_millis(ms);
            if requested > now {
                tracing::warn!(
                    timestamp_ms = ms,
                    "invocation timestamp is ahead of the daemon clock, using arrival time"
                );
                now
            } else {
                requested
            }
        }
        None => now,
    }
}

/// Notify the daemon that an invocation is about to run the handler.
///
/// When the tracker selects the at-start strategy, buffered telemetry has
/// already been flushed by the time this responds; the caller may safely
/// proceed into a handler whose environment could be reclaimed afterwards.
#[handler]
pub async fn invocation_start(
    query: Query<StartQuery>,
    processor: Data<&Arc<LifecycleProcessor>>,
) -> Json<AckResponse> {
    let at = arrival_time(query.timestamp_ms, SystemTime::now());

    let timing = processor.invocation_started(at).await;

    Json(AckResponse {
        success: true,
        strategy: Some(timing.name().to_string()),
        message: "invocation start recorded".to_string(),
    })
}

/// Notify the daemon that the handler has returned.
#[handler]
pub async fn invocation_end(processor: Data<&Arc<LifecycleProcessor>>) -> Json<AckResponse> {
    processor.invocation_ended();

    Json(AckResponse {
        success: true,
        strategy: None,
        message: "invocation end recorded".to_string(),
    })
}

/// Buffer an opaque telemetry payload for the next flush.
#[handler]
pub async fn submit_telemetry(
    payload: Json<serde_json::Value>,
    buffer: Data<&Arc<TelemetryBuffer>>,
) -> Json<AckResponse> {
    buffer.push(TelemetryRecord(payload.0));
    info!(buffered = buffer.len(), "telemetry payload buffered");

    Json(AckResponse {
        success: true,
        strategy: None,
        message: "telemetry buffered".to_string(),
    })
}
