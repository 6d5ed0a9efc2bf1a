use std::sync::Arc;

use error_stack::Report;
use poem::listener::TcpListener;
use poem::middleware::Tracing;
use poem::post;
use poem::EndpointExt;
use poem::Route;
use poem::Server;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;

use super::errors::ApiError;
use super::handlers::invocation_end;
use super::handlers::invocation_start;
use super::handlers::submit_telemetry;
use crate::flush::TelemetryBuffer;
use crate::lifecycle::LifecycleProcessor;

/// HTTP server receiving lifecycle notifications and telemetry payloads from
/// the hosting runtime.
pub struct ApiServer {
    processor: Arc<LifecycleProcessor>,
    buffer: Arc<TelemetryBuffer>,
    listen_addr: String,
}

/// Route table, shared between the server and tests.
pub fn routes(
    processor: Arc<LifecycleProcessor>,
    buffer: Arc<TelemetryBuffer>,
) -> impl poem::Endpoint {
    Route::new()
        .at("/lifecycle/start", post(invocation_start))
        .at("/lifecycle/end", post(invocation_end))
        .at("/telemetry", post(submit_telemetry))
        .data(processor)
        .data(buffer)
}

impl ApiServer {
    pub fn new(
        processor: Arc<LifecycleProcessor>,
        buffer: Arc<TelemetryBuffer>,
        listen_addr: String,
    ) -> Self {
        Self {
            processor,
            buffer,
            listen_addr,
        }
    }

    /// Start the API server.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ServerError`] if the server fails to start or bind
    pub async fn run(self, token: CancellationToken) -> Result<(), Report<ApiError>> {
        info!("Starting lifecycle API server on {}", self.listen_addr);

        let app = routes(self.processor, self.buffer).with(Tracing);
        let server = Server::new(TcpListener::bind(&self.listen_addr));

        tokio::select! {
            result = server.run(app) => {
                match result {
                    Ok(()) => {
                        info!("API server stopped normally");
                        Ok(())
                    }
                    Err(e) => {
                        error!("API server failed: {e}");
                        Err(Report::new(ApiError::ServerError {
                            message: format!("Server failed: {e}"),
                        }))
                    }
                }
            }
            _ = token.cancelled() => {
                info!("API server shutdown requested");
                Ok(())
            }
        }
    }
}
