//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{GatewayConfig, ServerDescriptor};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Server list parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid endpoint {host:?}: {reason}")]
    InvalidEndpoint { host: String, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate the gateway settings from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse the raw server list representation into descriptors.
pub fn parse_descriptors(raw: &str) -> Result<Vec<ServerDescriptor>, ConfigError> {
    Ok(serde_json::from_str(raw)?)
}

/// Where a server list is read from.
///
/// Sources only hand back raw text; parsing belongs to the registry so every
/// source fails the same way on malformed content.
pub trait ServerSource: Send + Sync {
    /// Read the current raw representation.
    fn read(&self) -> Result<String, ConfigError>;

    /// Human readable identity for logs.
    fn describe(&self) -> String;
}

/// A JSON server list on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ServerSource for FileSource {
    fn read(&self) -> Result<String, ConfigError> {
        fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A server list held in memory.
#[derive(Debug, Clone)]
pub struct InlineSource {
    raw: String,
}

impl InlineSource {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Build from a list of hosts.
    pub fn from_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let descriptors: Vec<ServerDescriptor> = hosts
            .into_iter()
            .map(|h| ServerDescriptor { host: h.into() })
            .collect();
        // Serializing a Vec of plain strings cannot fail.
        let raw = serde_json::to_string(&descriptors).unwrap_or_else(|_| "[]".to_string());
        Self { raw }
    }
}

impl ServerSource for InlineSource {
    fn read(&self) -> Result<String, ConfigError> {
        Ok(self.raw.clone())
    }

    fn describe(&self) -> String {
        "inline".to_string()
    }
}
