//! Structured logging via `tracing` + `tracing-subscriber` +
//! `tracing-appender`. A single non-reloadable layer: this crate runs
//! one simulation per process invocation, so there is no running-service
//! case that needs to swap filters or outputs mid-flight.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

pub mod prelude {
    pub use tracing::{debug, debug_span, error, info, info_span, instrument, trace, warn};
}

/// Holds the non-blocking writer's worker thread alive for the process
/// lifetime; dropping it flushes and stops the writer.
pub struct LoggingGuard(#[allow(dead_code)] WorkerGuard);

/// Install a global `tracing` subscriber reading `RUST_LOG`, defaulting
/// to `info` when unset. Must be held in `main` for the process lifetime.
pub fn setup() -> crate::error::Result<LoggingGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| crate::error::Error::Other(anyhow::anyhow!(e)))?;

    Ok(LoggingGuard(guard))
}
