//! Adapter configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [sessions]
//! lookup = "distributed"
//!
//! [deployment]
//! realm = "hospital"
//! resource = "portal"
//! token_store = "session"
//! ```
//!
//! Every value can be overridden from the environment, e.g.
//! `SESSIONWARD__DEPLOYMENT__REALM=staging`.

use serde::{Deserialize, Serialize};
use sessionward_core::SessionsConfig;

use crate::deployment::Deployment;

/// Root adapter configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Host session configuration.
    pub sessions: SessionsConfig,

    /// Identity-provider deployment.
    pub deployment: Deployment,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level, used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration sources could not be read or merged.
    #[error("Configuration load error: {0}")]
    Load(String),
}

impl AdapterConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the realm, resource or a cookie name
    /// is empty, and `ConfigError::InvalidValue` if the log level or the
    /// SameSite attribute is not recognized.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid log level: '{}'. Must be trace, debug, info, warn, or error",
                    other
                )));
            }
        }

        let deployment = &self.deployment;
        if deployment.realm.is_empty() {
            return Err(ConfigError::Missing("deployment.realm".to_string()));
        }

        if deployment.resource.is_empty() {
            return Err(ConfigError::Missing("deployment.resource".to_string()));
        }

        if deployment.session_cookie_name.is_empty() {
            return Err(ConfigError::Missing(
                "deployment.session_cookie_name".to_string(),
            ));
        }

        if deployment.state_cookie.name.is_empty() {
            return Err(ConfigError::Missing("deployment.state_cookie.name".to_string()));
        }

        match deployment.state_cookie.same_site.as_str() {
            "Strict" | "Lax" | "None" => {}
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid SameSite value: '{}'. Must be Strict, Lax, or None",
                    other
                )));
            }
        }

        if deployment.state_cookie.same_site == "None" && !deployment.state_cookie.secure {
            return Err(ConfigError::InvalidValue(
                "SameSite=None requires a secure state cookie".to_string(),
            ));
        }

        Ok(())
    }
}

pub mod loader {
    use std::path::{Path, PathBuf};

    use config::{Config, Environment, File};

    use super::{AdapterConfig, ConfigError};

    /// Default configuration file, relative to the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "sessionward.toml";

    /// Loads, merges and validates the adapter configuration.
    ///
    /// Sources, lowest precedence first: built-in defaults, the TOML file at
    /// `path` (or [`DEFAULT_CONFIG_FILE`]) when it exists, and `SESSIONWARD__*`
    /// environment variables.
    pub fn load_config(path: Option<&Path>) -> Result<AdapterConfig, ConfigError> {
        let mut builder = Config::builder();
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        }

        // Environment variable overrides, e.g., SESSIONWARD__SESSIONS__LOOKUP=distributed
        builder = builder.add_source(
            Environment::with_prefix("SESSIONWARD")
                .try_parsing(true)
                .separator("__"),
        );

        let merged: AdapterConfig = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;
        merged.validate()?;
        Ok(merged)
    }
}
