//! Structured logging bootstrap for hosts embedding the plugin

use crate::error::{OnDemandError, Result};
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "ondemand_i18n=trace")
    pub level: String,
    /// Whether to emit JSON lines
    pub json_format: bool,
    /// Whether to enable pretty formatting with colors
    pub pretty_format: bool,
    /// Optional file path for log output
    pub file_path: Option<String>,
    /// Whether to include span open/close events
    pub include_spans: bool,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_format: false,
            file_path: None,
            include_spans: false,
            include_targets: true,
        }
    }
}

impl LoggingConfig {
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

fn open_log_file(path: &str) -> Result<Mutex<std::fs::File>> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    Ok(Mutex::new(file))
}

fn already_initialized(err: impl std::error::Error + Send + Sync + 'static) -> OnDemandError {
    OnDemandError::config_with_source("Global tracing subscriber already set", err)
}

/// Initialize the tracing subscriber with the given configuration
///
/// Fails if a global subscriber is already installed or the log file
/// cannot be opened.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    let span_events = config.span_events();

    if config.json_format {
        let layer = fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_target(config.include_targets);

        match config.file_path.as_deref() {
            Some(path) => registry
                .with(layer.with_writer(open_log_file(path)?))
                .try_init()
                .map_err(already_initialized),
            None => registry.with(layer).try_init().map_err(already_initialized),
        }
    } else if config.pretty_format {
        let layer = fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_target(config.include_targets);

        match config.file_path.as_deref() {
            Some(path) => registry
                .with(layer.with_ansi(false).with_writer(open_log_file(path)?))
                .try_init()
                .map_err(already_initialized),
            None => registry.with(layer).try_init().map_err(already_initialized),
        }
    } else {
        let layer = fmt::layer()
            .with_span_events(span_events)
            .with_target(config.include_targets);

        match config.file_path.as_deref() {
            Some(path) => registry
                .with(layer.with_ansi(false).with_writer(open_log_file(path)?))
                .try_init()
                .map_err(already_initialized),
            None => registry.with(layer).try_init().map_err(already_initialized),
        }
    }
}

/// Initialize logging with default configuration
pub fn init_default_logging() -> Result<()> {
    init_logging(LoggingConfig::default())
}

/// Initialize logging for development (pretty, debug level)
pub fn init_dev_logging() -> Result<()> {
    init_logging(LoggingConfig {
        level: "debug".to_string(),
        pretty_format: true,
        include_spans: true,
        ..LoggingConfig::default()
    })
}
