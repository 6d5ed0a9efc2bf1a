mod api;
mod app;
mod config;
mod flush;
mod lifecycle;
mod logging;

use anyhow::Result;
use clap::Parser;

use crate::app::Application;
use crate::config::DaemonArgs;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let args = DaemonArgs::parse();

    logging::init();

    tracing::info!("Starting telemetry daemon {}", env!("CARGO_PKG_VERSION"));

    let app = Application::build(args)?;
    app.run().await?;

    Ok(())
}
