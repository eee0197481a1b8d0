//! Server runtime configuration.
//!
//! # Responsibility
//! - Read `BOARDTREE_*` environment overrides once at startup into a typed
//!   struct with documented defaults.
//!
//! # Invariants
//! - Absent or malformed variables fall back to their defaults; configuration
//!   loading never fails.

use boardtree_core::default_log_level;
use std::env;

const ENV_HOST: &str = "BOARDTREE_HOST";
const ENV_PORT: &str = "BOARDTREE_PORT";
const ENV_DB: &str = "BOARDTREE_DB";
const ENV_LOG_DIR: &str = "BOARDTREE_LOG_DIR";
const ENV_LOG_LEVEL: &str = "BOARDTREE_LOG_LEVEL";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB: &str = "boardtree.db";

/// Effective server configuration, resolved once in `main`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    pub host: String,
    /// Bind port for the HTTP listener.
    pub port: u16,
    /// SQLite database file path.
    pub db_path: String,
    /// Directory for rolling log files.
    pub log_dir: String,
    /// Log level filter passed to logging init.
    pub log_level: String,
}

impl ServerConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            host: env::var(ENV_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var(ENV_PORT)
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            db_path: env::var(ENV_DB).unwrap_or_else(|_| DEFAULT_DB.to_string()),
            log_dir: env::var(ENV_LOG_DIR).unwrap_or_else(|_| default_log_dir()),
            log_level: env::var(ENV_LOG_LEVEL)
                .unwrap_or_else(|_| default_log_level().to_string()),
        }
    }
}

fn default_log_dir() -> String {
    env::current_dir()
        .map(|dir| dir.join("logs").to_string_lossy().into_owned())
        .unwrap_or_else(|_| "logs".to_string())
}
