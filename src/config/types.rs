// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Listener and process pool configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of worker processes (CPU cores when unset)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Dispatch configuration: keys, handlers and error exposure
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// JSON array of authorized keys, re-read on every request
    pub keys_file: PathBuf,
    /// Directory scanned once at startup for executable handlers
    pub handlers_dir: PathBuf,
    /// Built-in commands to register
    pub builtins: Vec<String>,
    /// Include the handler's diagnostic detail in 400 bodies
    pub expose_error_detail: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
}

/// Status page configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StatusConfig {
    /// Template file; the embedded page is used when unset
    #[serde(default)]
    pub template: Option<PathBuf>,
}
