//! apigate - a multi-process HTTP API gateway
//!
//! Authenticates requests by static key, dispatches `/api/<command>` to
//! registered handlers and serves a per-worker status page on `/`.

mod commands;
mod config;
mod gateway;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg.logging)?;

    server::run(cfg)
}
