//! Gateway core
//!
//! Key checks, command lookup, dispatch and usage statistics for a single
//! worker process. Nothing in here is shared between workers.

mod error;
pub mod keystore;
mod registry;
mod router;
mod stats;
pub mod status;

pub use error::{GatewayError, HandlerError, KeyStoreError, LoadError};
pub use keystore::{FileKeySource, KeyStore};
pub use registry::HandlerRegistry;
pub use router::Router;
pub use stats::{Stats, StatsSnapshot};
pub use status::StatusPage;
