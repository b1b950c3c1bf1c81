//! Configuration schema definitions using serde with validation attributes.

use ondemand_common::logging::LoggingConfig;
use ondemand_common::OnDemandError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Plugin behaviour.
    #[validate]
    pub plugin: PluginConfig,
    /// Logging setup for hosts that let the plugin bootstrap tracing.
    #[validate]
    pub logging: LoggingSettings,
}

/// Settings of the on-demand key loader. Immutable once the plugin is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PluginConfig {
    /// Rendered for any key that has not been resolved yet.
    pub missing_key_placeholder: String,

    /// Quiet period before a bucket is flushed.
    #[validate(range(
        max = 60000,
        message = "Debounce delay must not exceed 60000 milliseconds"
    ))]
    pub debounce_delay_ms: u64,

    /// Resolver calls running longer than this count as failed.
    #[validate(range(
        min = 1,
        max = 600000,
        message = "Resolver timeout must be between 1 and 600000 milliseconds"
    ))]
    pub resolver_timeout_ms: Option<u64>,
}

impl PluginConfig {
    /// Debounce delay as a [`Duration`].
    pub const fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    /// Resolver timeout as a [`Duration`], if one is configured.
    pub fn resolver_timeout(&self) -> Option<Duration> {
        self.resolver_timeout_ms.map(Duration::from_millis)
    }

    /// Checks the validation rules, reporting failures as a workspace error.
    pub fn validate_settings(&self) -> ondemand_common::Result<()> {
        self.validate()
            .map_err(|errors| OnDemandError::validation(errors.to_string()))
    }

    /// Sets the placeholder rendered for unresolved keys.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.missing_key_placeholder = placeholder.into();
        self
    }

    /// Sets the debounce delay.
    #[must_use]
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the resolver timeout.
    #[must_use]
    pub fn with_resolver_timeout(mut self, timeout: Duration) -> Self {
        self.resolver_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

/// Logging configuration as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `ondemand_i18n=debug`.
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
    /// Optional file to append logs to.
    pub file: Option<String>,
}

impl LoggingSettings {
    /// Converts the file settings into the subscriber configuration.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            json_format: self.json,
            file_path: self.file.clone(),
            ..LoggingConfig::default()
        }
    }
}

impl Config {
    /// Runs every validation rule.
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }
}
