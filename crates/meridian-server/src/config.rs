//! Server configuration.

use meridian_core::EngineError;
use meridian_valuation::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading the server configuration.
#[derive(Debug, Error)]
pub enum ServerConfigError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The engine settings are out of range.
    #[error("invalid engine configuration: {0}")]
    Invalid(#[from] EngineError),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// JSON file of companies to seed the in-memory lookup with
    pub companies_file: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            engine: EngineConfig::default(),
            companies_file: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self, ServerConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and validate the engine settings.
    pub fn from_toml_str(content: &str) -> Result<Self, ServerConfigError> {
        let config: Self = toml::from_str(content)?;
        config.engine.validate()?;
        Ok(config)
    }
}
