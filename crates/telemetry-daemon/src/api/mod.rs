//! HTTP intake for runtime lifecycle notifications and telemetry payloads.

pub mod errors;
pub mod handlers;
pub mod server;
pub mod types;

pub use server::ApiServer;
