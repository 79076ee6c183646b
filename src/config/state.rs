// Application state module
// Everything one worker process owns: configuration, router and status page

use anyhow::Context;

use super::types::Config;
use crate::gateway::{FileKeySource, HandlerRegistry, KeyStore, Router, StatusPage};

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Router,
    pub status: StatusPage,
}

impl AppState {
    /// Load handlers and the status template for this worker
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let status = StatusPage::load(config.status.template.as_deref()).with_context(|| {
            format!(
                "failed to read status template {:?}",
                config.status.template
            )
        })?;
        let registry = HandlerRegistry::load(&config.gateway);
        Ok(Self::with_parts(config, registry, status))
    }

    /// Assemble state from an already loaded registry and status page
    pub fn with_parts(config: Config, registry: HandlerRegistry, status: StatusPage) -> Self {
        let router = Router::new(
            registry,
            KeyStore::new(FileKeySource::new(&config.gateway.keys_file)),
            config.gateway.expose_error_detail,
        );
        Self {
            config,
            router,
            status,
        }
    }
}
