use serde::Deserialize;
use serde::Serialize;

/// Query parameters for the invocation start notification.
#[derive(Debug, Deserialize)]
pub struct StartQuery {
    /// Invocation arrival time as milliseconds since the Unix epoch; the
    /// daemon's own clock is used when absent.
    pub timestamp_ms: Option<u64>,
}

/// Acknowledgement returned by the lifecycle and telemetry endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    /// Flush timing active for this invocation, when the endpoint selects one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub message: String,
}
