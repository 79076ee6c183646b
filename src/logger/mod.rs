//! Logger module
//!
//! Thin layer over `tracing` providing:
//! - Subscriber setup from the logging configuration
//! - Named lifecycle events for the coordinator and workers
//! - Access logging with multiple formats

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Target used for access log lines so they can be filtered separately
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level` when set.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, commands: usize) {
    tracing::info!(
        %addr,
        commands,
        keys_file = %config.gateway.keys_file.display(),
        access_log = config.logging.access_log,
        "worker listening on http://{addr}"
    );
}

pub fn log_workers_spawning(count: usize) {
    tracing::info!(count, "starting {count} workers");
}

pub fn log_worker_exit(id: usize, status: &std::process::ExitStatus) {
    if status.success() {
        tracing::info!(worker = id, %status, "worker exited");
    } else {
        tracing::error!(worker = id, %status, "worker exited abnormally");
    }
}

pub fn log_handler_loaded(name: &str, source: &str) {
    tracing::debug!(command = name, source, "registered command");
}

pub fn log_handler_load_failure(file: &str, err: &impl std::fmt::Display) {
    tracing::warn!(file, "There was an error with '{file}': {err}");
}

pub fn log_handler_failure(command: &str, message: &str, detail: &str) {
    tracing::warn!(command, "There was an error: {message} | {detail}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
