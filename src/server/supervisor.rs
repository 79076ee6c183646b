//! Worker supervisor
//!
//! The first process started is the coordinator. It re-executes the current
//! binary once per worker with `APIGATE_WORKER_ID` set and then only watches
//! its children. A process that finds the variable set is a worker: it binds
//! its own `SO_REUSEPORT` listener and serves requests on a single-threaded
//! runtime. Workers never spawn further processes.

use std::ffi::OsString;
use std::future::Future;
use std::num::NonZeroUsize;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;

use anyhow::Context;
use tokio::process::Command;
use tokio::task::{JoinSet, LocalSet};
use tracing::Instrument;

use super::listener::create_reusable_listener;
use super::server_loop::start_server_loop;
use super::signal::shutdown_signal;
use crate::config::{AppState, Config};
use crate::logger;

/// Environment variable marking a process as a worker
pub const WORKER_ENV: &str = "APIGATE_WORKER_ID";

const LISTEN_BACKLOG: i32 = 1024;

type WorkerSet = JoinSet<(usize, std::io::Result<ExitStatus>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Coordinator,
    Worker(usize),
}

impl Role {
    pub fn from_env() -> Self {
        Self::detect(std::env::var(WORKER_ENV).ok().as_deref())
    }

    /// Any value marks a worker, so a worker can never become a coordinator
    pub fn detect(marker: Option<&str>) -> Self {
        match marker {
            None => Self::Coordinator,
            Some(id) => Self::Worker(id.trim().parse().unwrap_or(0)),
        }
    }
}

/// Configured count, else the CPU count; never zero
pub fn worker_count(configured: Option<usize>, available: Option<NonZeroUsize>) -> usize {
    configured
        .filter(|n| *n > 0)
        .or_else(|| available.map(NonZeroUsize::get))
        .unwrap_or(1)
}

/// Run as coordinator or worker depending on the environment
pub fn run(config: Config) -> anyhow::Result<()> {
    match Role::from_env() {
        Role::Coordinator => run_coordinator(&config),
        Role::Worker(id) => run_worker(id, config),
    }
}

fn run_coordinator(config: &Config) -> anyhow::Result<()> {
    let count = worker_count(
        config.server.workers,
        std::thread::available_parallelism().ok(),
    );
    let exe = std::env::current_exe().context("cannot locate current executable")?;
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        logger::log_workers_spawning(count);
        let workers = spawn_workers(&exe, &args, count)?;
        supervise(workers, shutdown_signal()).await
    })
}

/// Start `count` copies of `exe`, each tagged with its worker id
pub fn spawn_workers(exe: &Path, args: &[OsString], count: usize) -> anyhow::Result<WorkerSet> {
    let mut workers = JoinSet::new();
    for id in 0..count {
        let mut child = Command::new(exe)
            .args(args)
            .env(WORKER_ENV, id.to_string())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn worker {id}"))?;

        tracing::info!(worker = id, pid = child.id(), "worker started");
        workers.spawn(async move { (id, child.wait().await) });
    }
    Ok(workers)
}

/// Wait for workers to exit; on a shutdown signal the remaining ones are killed
async fn supervise(
    mut workers: WorkerSet,
    shutdown: impl Future<Output = std::io::Result<&'static str>>,
) -> anyhow::Result<()> {
    tokio::pin!(shutdown);
    let mut failed = 0usize;

    loop {
        tokio::select! {
            joined = workers.join_next() => match joined {
                None => break,
                Some(Ok((id, Ok(status)))) => {
                    logger::log_worker_exit(id, &status);
                    if !status.success() {
                        failed += 1;
                    }
                }
                Some(Ok((id, Err(e)))) => {
                    logger::log_error(&format!("Lost track of worker {id}: {e}"));
                    failed += 1;
                }
                Some(Err(e)) => {
                    logger::log_error(&format!("Worker wait task failed: {e}"));
                    failed += 1;
                }
            },

            signal = &mut shutdown => {
                let name = signal.context("failed to install signal handlers")?;
                tracing::info!(signal = name, remaining = workers.len(), "stopping workers");
                // Dropping each child kills it
                workers.shutdown().await;
                return Ok(());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} worker(s) exited abnormally");
    }
    tracing::info!("all workers exited");
    Ok(())
}

fn run_worker(id: usize, config: Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = LocalSet::new();

    local.block_on(&runtime, serve(config).instrument(tracing::info_span!("worker", id)))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.get_socket_addr().map_err(anyhow::Error::msg)?;
    let state = Arc::new(AppState::new(config)?);
    let listener = create_reusable_listener(addr, LISTEN_BACKLOG)
        .with_context(|| format!("failed to bind {addr}"))?;

    logger::log_server_start(&addr, &state.config, state.router.commands());
    if !state.router.has_commands() {
        logger::log_warning("No commands registered; every /api request will be a 404");
    }

    let shutdown = async {
        match shutdown_signal().await {
            Ok(name) => tracing::info!(signal = name, "worker stopping"),
            Err(e) => {
                logger::log_error(&format!("Signal handlers unavailable: {e}"));
                std::future::pending::<()>().await;
            }
        }
    };
    start_server_loop(listener, state, shutdown).await;
    Ok(())
}
