//! Tracing configuration and log routing.
//!
//! Diagnostics go to stdout with a compact formatter; pipeline failures are
//! only ever reported there, never in HTTP responses. When
//! `CONTRACT_QA_LOG_FILE` is set, logs are additionally appended to that
//! path; otherwise a file logger is created under `logs/contract-qa.log`.

use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Configure tracing subscribers for stdout and optional file logging.
///
/// Respects `RUST_LOG` for filtering (defaults to `info`). The file writer is
/// non-blocking; its guard lives for the process lifetime.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match file_writer() {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
}

/// Open the file logging target, honoring the `CONTRACT_QA_LOG_FILE` override.
///
/// Returns `None` when neither the explicit path nor the `logs/` fallback is
/// usable; the server then runs with stdout logging only.
fn file_writer() -> Option<NonBlocking> {
    let (non_blocking, guard) = match std::env::var("CONTRACT_QA_LOG_FILE") {
        Ok(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| eprintln!("Failed to open log file {path}: {err}"))
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        Err(_) => {
            std::fs::create_dir_all("logs")
                .map_err(|err| eprintln!("Failed to create logs directory: {err}"))
                .ok()?;
            let appender = tracing_appender::rolling::never("logs", "contract-qa.log");
            tracing_appender::non_blocking(appender)
        }
    };
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}
