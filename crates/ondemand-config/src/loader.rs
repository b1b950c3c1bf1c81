//! Configuration loading utilities

use crate::Config;
use ondemand_common::OnDemandError;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable pointing at the configuration file.
pub const CONFIG_PATH_ENV: &str = "ONDEMAND_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for OnDemandError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(errors) => Self::validation(errors.to_string()),
            other => Self::config_with_source("Failed to load configuration", other),
        }
    }
}

/// Configuration loader for the plugin
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        debug!("Loading configuration from {:?}", path.as_ref());
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Parse and validate configuration from a YAML string, without environment overrides
    pub fn from_yaml_str(content: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from the environment and well-known file names
    ///
    /// Checks `ONDEMAND_CONFIG_PATH`, then `ondemand.yaml` and `ondemand.yml`
    /// in the working directory, and finally falls back to defaults.
    pub fn load() -> ondemand_common::Result<Config> {
        let config = if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::load_config(&config_path)?
        } else if Path::new("ondemand.yaml").exists() {
            Self::load_config("ondemand.yaml")?
        } else if Path::new("ondemand.yml").exists() {
            Self::load_config("ondemand.yml")?
        } else {
            info!("No configuration file found, using defaults");
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config)?;
            config.validate_all().map_err(ConfigError::ValidationError)?;
            config
        };

        Ok(config)
    }

    /// Apply process environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |name| env::var(name).ok())
    }

    /// Apply overrides read through `lookup`
    ///
    /// Recognised variables: `ONDEMAND_MISSING_KEY_PLACEHOLDER`,
    /// `ONDEMAND_DEBOUNCE_DELAY_MS`, `ONDEMAND_RESOLVER_TIMEOUT_MS` and
    /// `ONDEMAND_LOG_LEVEL`.
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(placeholder) = lookup("ONDEMAND_MISSING_KEY_PLACEHOLDER") {
            config.plugin.missing_key_placeholder = placeholder;
        }

        if let Some(delay) = lookup("ONDEMAND_DEBOUNCE_DELAY_MS") {
            config.plugin.debounce_delay_ms = parse_var("ONDEMAND_DEBOUNCE_DELAY_MS", &delay)?;
        }

        if let Some(timeout) = lookup("ONDEMAND_RESOLVER_TIMEOUT_MS") {
            config.plugin.resolver_timeout_ms = if timeout.trim().is_empty() {
                None
            } else {
                Some(parse_var("ONDEMAND_RESOLVER_TIMEOUT_MS", &timeout)?)
            };
        }

        if let Some(level) = lookup("ONDEMAND_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var(var: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::EnvParseError {
            var: var.to_string(),
            source: Box::new(e),
        })
}
