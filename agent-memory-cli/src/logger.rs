//! Tracing setup: one fmt layer written to both stderr and a log file.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, fmt::writer::MakeWriterExt, layer::SubscriberExt,
    util::SubscriberInitExt, EnvFilter, Registry,
};

/// Env var overriding the log file path.
pub const LOG_FILE_ENV: &str = "AGENT_MEMORY_LOG";
pub const DEFAULT_LOG_FILE: &str = "agent-memory.log";

/// Log file path from `AGENT_MEMORY_LOG`, falling back to `agent-memory.log`.
pub fn log_file_path() -> String {
    std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
}

/// Installs the global subscriber. Level comes from `RUST_LOG` (default `info`), so load
/// `.env` first.
///
/// Logs go to stderr so demo output on stdout stays readable.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let file = Arc::new(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr.and(file))
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
