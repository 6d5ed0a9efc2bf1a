use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use flush_timing::InvocationTracker;
use flush_timing::TrackerConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ApiServer;
use crate::config::DaemonArgs;
use crate::flush::FlushExecutor;
use crate::flush::LoggingSink;
use crate::flush::PeriodicFlusher;
use crate::flush::TelemetryBuffer;
use crate::lifecycle::LifecycleProcessor;

/// Application core structure, managing all components
pub struct Application {
    pub tracker: Arc<InvocationTracker>,
    pub buffer: Arc<TelemetryBuffer>,
    pub executor: Arc<FlushExecutor>,
    pub processor: Arc<LifecycleProcessor>,
    pub daemon_args: DaemonArgs,
}

impl Application {
    /// Wire up all components from the daemon arguments.
    pub fn build(daemon_args: DaemonArgs) -> Result<Self> {
        let tracker = Arc::new(
            InvocationTracker::with_config(TrackerConfig::default())
                .map_err(error_stack::Report::into_error)
                .context("invalid tracker configuration")?,
        );
        let buffer = Arc::new(TelemetryBuffer::new());
        let executor = Arc::new(FlushExecutor::new(
            buffer.clone(),
            Arc::new(LoggingSink),
            Duration::from_millis(daemon_args.flush_timeout_ms),
        ));
        let processor = Arc::new(LifecycleProcessor::new(tracker.clone(), executor.clone()));

        Ok(Self {
            tracker,
            buffer,
            executor,
            processor,
            daemon_args,
        })
    }

    /// Run application, start all tasks and wait for completion
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Starting all application tasks...");

        let mut tasks = Tasks::new();
        tasks.spawn_all_tasks(self);

        tracing::info!("All application tasks started successfully");

        tasks.wait_for_completion().await
    }
}

/// Task manager, responsible for starting and managing all background tasks
pub struct Tasks {
    pub tasks: Vec<JoinHandle<()>>,
    cancellation_token: CancellationToken,
}

impl Default for Tasks {
    fn default() -> Self {
        Self::new()
    }
}

impl Tasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start all background tasks
    pub fn spawn_all_tasks(&mut self, app: &Application) {
        let args = &app.daemon_args;

        // Start API server task
        let api_server_task = {
            let processor = app.processor.clone();
            let buffer = app.buffer.clone();
            let listen_addr = args.api_listen_addr.clone();
            let token = self.cancellation_token.clone();

            tokio::spawn(async move {
                tracing::info!("Starting API server on {}", listen_addr);
                let api_server = ApiServer::new(processor, buffer, listen_addr);
                if let Err(e) = api_server.run(token).await {
                    tracing::error!("API server failed: {e:?}");
                } else {
                    tracing::info!("API server completed");
                }
            })
        };
        self.tasks.push(api_server_task);

        // Start periodic flusher task
        let periodic_flusher_task = {
            let flusher = PeriodicFlusher::new(app.executor.clone(), app.tracker.clone());
            let interval = Duration::from_secs(args.flush_interval_secs);
            let token = self.cancellation_token.clone();

            tokio::spawn(async move {
                tracing::info!("Starting periodic flusher task");
                flusher.run(interval, token).await;
                tracing::info!("Periodic flusher task completed");
            })
        };
        self.tasks.push(periodic_flusher_task);
    }

    /// wait for tasks to complete or receive shutdown signal
    pub async fn wait_for_completion(&mut self) -> Result<()> {
        // take all tasks from Vec to avoid borrow issues
        let mut tasks = std::mem::take(&mut self.tasks);

        tokio::select! {
            result = async {
                while let Some(task) = tasks.pop() {
                    if let Ok(result) = task.await {
                        return Some(result);
                    }
                }
                None
            } => {
                if result.is_some() {
                    tracing::error!("A task completed unexpectedly");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down...");
            }
        }

        // Cancel the remaining tasks using the unified cancellation token
        tracing::info!("Cancelling all tasks...");
        self.cancellation_token.cancel();

        futures::future::join_all(tasks).await;

        Ok(())
    }
}
