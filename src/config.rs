//! # Configuration Management
//!
//! This module handles loading and managing application configuration from multiple sources:
//! - TOML configuration files (config.toml)
//! - Environment variables (with APP_ prefix)
//! - Deployment variables carried over from the original hosting setup
//!   (S3_BUCKET, DYNAMO_TABLE, HOST, PORT)
//! - Default values (built into the code)
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Deployment variables (S3_BUCKET, DYNAMO_TABLE, HOST, PORT)
//! 2. Environment variables (APP_SERVER__PORT, APP_STORAGE__BUCKET, etc.)
//! 3. Configuration file (config.toml)
//! 4. Default values (defined in the Default impl)
//!
//! The bucket and table have no usable default: the service refuses to start
//! until both are provided.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main application configuration that contains all settings.
///
/// Read once at process start and shared read-only afterwards; nothing in the
/// request path mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
    pub errors: ErrorsConfig,
}

/// Server-specific configuration settings.
///
/// ## Fields:
/// - `host`: IP address or hostname to bind the server to (e.g., "127.0.0.1", "0.0.0.0")
/// - `port`: TCP port number to listen on
/// - `max_body_bytes`: transport limit for a request body. Base64 inflates audio by
///   roughly a third, so this needs headroom above the largest expected recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

/// Which store implementation backs the object and metadata stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under `root_dir`, one object file per key and one JSON document per record
    Local,
    /// Process-local maps, lost on restart
    Memory,
}

/// Object-store and metadata-store settings.
///
/// ## Fields:
/// - `backend`: store implementation to construct at startup
/// - `root_dir`: base directory for the `local` backend
/// - `bucket`: object-store bucket identifier (required)
/// - `table`: metadata-store table identifier (required)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub root_dir: PathBuf,
    pub bucket: String,
    pub table: String,
}

/// CORS headers attached to every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`. Use a specific origin in production.
    pub allow_origin: String,
}

/// Controls how upload failures map onto HTTP status codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorsConfig {
    /// When true, store failures answer 500 instead of the historical 400.
    pub typed_status_codes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),  // Localhost only (safe for development)
                port: 8080,
                max_body_bytes: 64 * 1024 * 1024,
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                root_dir: PathBuf::from("./data"),
                bucket: String::new(),  // Must be configured
                table: String::new(),   // Must be configured
            },
            cors: CorsConfig {
                allow_origin: "*".to_string(),
            },
            errors: ErrorsConfig {
                typed_status_codes: false,
            },
        }
    }
}

/// Deployment variables and the config keys they override.
const DEPLOYMENT_OVERRIDES: [(&str, &str); 4] = [
    ("S3_BUCKET", "storage.bucket"),
    ("DYNAMO_TABLE", "storage.table"),
    ("HOST", "server.host"),
    ("PORT", "server.port"),
];

/// Layer the deployment variables on top of `settings`. `lookup` resolves a
/// variable name, normally from the process environment.
fn apply_deployment_overrides<F>(
    mut settings: config::ConfigBuilder<config::builder::DefaultState>,
    lookup: F,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in DEPLOYMENT_OVERRIDES {
        if let Some(value) = lookup(var) {
            settings = settings.set_override(key, value)?;
        }
    }
    Ok(settings)
}

impl AppConfig {
    /// Load configuration from multiple sources in priority order.
    ///
    /// ## Configuration Loading Process:
    /// 1. Start with built-in defaults
    /// 2. Override with values from config.toml (if it exists)
    /// 3. Override with environment variables prefixed with APP_
    /// 4. Handle special cases for the deployment variables
    ///
    /// ## Environment Variable Examples:
    /// - `APP_SERVER__PORT=3000`: Override server port
    /// - `APP_STORAGE__BACKEND=memory`: Use the in-memory stores
    /// - `APP_CORS__ALLOW_ORIGIN=https://app.example.com`: Restrict CORS origin
    /// - `S3_BUCKET=recordings`: Object-store bucket
    /// - `DYNAMO_TABLE=audio-records`: Metadata-store table
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            // `__` separates nesting levels so field names keep their underscores:
            // APP_CORS__ALLOW_ORIGIN becomes cors.allow_origin
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        settings = apply_deployment_overrides(settings, |var| env::var(var).ok())?;

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// ## What this checks:
    /// - Server port is not 0
    /// - Body limit is greater than 0
    /// - Bucket and table identifiers are present (fatal at startup otherwise)
    /// - CORS origin is not empty
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.server.max_body_bytes == 0 {
            return Err(anyhow::anyhow!("Max body size must be greater than 0"));
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "Object-store bucket is not configured (set S3_BUCKET or storage.bucket)"
            ));
        }

        if self.storage.table.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "Metadata-store table is not configured (set DYNAMO_TABLE or storage.table)"
            ));
        }

        if self.cors.allow_origin.trim().is_empty() {
            return Err(anyhow::anyhow!("CORS allow_origin cannot be empty"));
        }

        Ok(())
    }
}
