use clap::Parser;

/// Telemetry flush daemon for serverless runtimes.
#[derive(Debug, Clone, Parser)]
#[command(about, version)]
pub struct DaemonArgs {
    #[arg(
        long,
        env = "TELEMETRY_API_LISTEN_ADDR",
        default_value = "127.0.0.1:8124",
        help = "HTTP lifecycle/telemetry API listen address"
    )]
    pub api_listen_addr: String,

    #[arg(
        long,
        env = "TELEMETRY_FLUSH_TIMEOUT_MS",
        default_value = "5000",
        help = "Deadline for a single flush submission in milliseconds"
    )]
    pub flush_timeout_ms: u64,

    #[arg(
        long,
        env = "TELEMETRY_FLUSH_INTERVAL_SECS",
        default_value = "60",
        help = "Safety-net interval for flushing buffered telemetry during idle stretches"
    )]
    pub flush_interval_secs: u64,
}
