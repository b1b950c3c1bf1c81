//! Default values.

use crate::schema::{LoggingSettings, PluginConfig};

/// Debounce delay applied when none is configured.
pub const DEFAULT_DEBOUNCE_DELAY_MS: u64 = 100;

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            missing_key_placeholder: String::new(),
            debounce_delay_ms: DEFAULT_DEBOUNCE_DELAY_MS,
            resolver_timeout_ms: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_plugin_defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.missing_key_placeholder, "");
        assert_eq!(config.debounce_delay(), Duration::from_millis(100));
        assert!(config.resolver_timeout().is_none());
    }

    #[test]
    fn test_logging_defaults_map_to_subscriber_config() {
        let logging = LoggingSettings::default().to_logging_config();
        assert_eq!(logging.level, "info");
        assert!(!logging.json_format);
        assert!(logging.file_path.is_none());
    }
}
