//! Configuration for the unitconv server.
//!
//! Configuration is read from a YAML file. When the file is missing or
//! invalid the server starts with `Config::default()` and says so in the log.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Default configuration file name used when no explicit path is provided.
pub const DEFAULT_CONFIG_PATH: &str = "unitconv.yaml";

/// Supported configuration schema version.
pub const SUPPORTED_CONFIG_VERSION: u8 = 1;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

// Serde requires functions for default values, not constants
fn default_version() -> u8 {
    SUPPORTED_CONFIG_VERSION
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_seed_defaults() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u8,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Install the built-in unit tables (weight) on startup when absent
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            seed_defaults: default_seed_defaults(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Snapshot location; required for the file backend
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Validate configuration invariants, collecting every violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut reasons = Vec::new();

        if self.version != SUPPORTED_CONFIG_VERSION {
            reasons.push(format!(
                "version must equal {}, got {}",
                SUPPORTED_CONFIG_VERSION, self.version
            ));
        }

        let bind_address = self.server.bind_address.trim();
        if bind_address.is_empty() {
            reasons.push("server.bind_address must not be empty".to_string());
        } else if let Err(err) = bind_address.parse::<std::net::SocketAddr>() {
            reasons.push(format!(
                "server.bind_address is not a valid socket address: {}",
                err
            ));
        }

        if self.storage.backend == StorageBackend::File {
            match &self.storage.path {
                None => reasons.push("storage.path is required for the file backend".to_string()),
                Some(path) if path.as_os_str().is_empty() => {
                    reasons.push("storage.path must not be empty".to_string())
                }
                Some(_) => {}
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { reasons })
        }
    }

    /// Read, parse and validate the configuration at `path`.
    pub async fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config = serde_yaml::from_str::<Config>(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config
            .validate()
            .map_err(|source| ConfigError::Validation {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing or invalid.
    /// The flag is true when defaults were used.
    pub async fn load_or_default(path: &Path) -> (Config, bool) {
        match Config::load(path).await {
            Ok(config) => {
                info!(path = %path.display(), status = "applied", "Loaded configuration");
                (config, false)
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Using default configuration due to load failure"
                );
                (Config::default(), true)
            }
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("configuration validation failed for {path}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

/// Validation failure containing the list of violated invariants.
#[derive(Debug, Error, Clone)]
#[error("configuration validation failed: {reasons:?}")]
pub struct ValidationError {
    reasons: Vec<String>,
}

impl ValidationError {
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }
}
