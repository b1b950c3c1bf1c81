//! Error types and utilities for i18n-ondemand

use thiserror::Error;

/// Result type alias for i18n-ondemand operations
pub type Result<T> = std::result::Result<T, OnDemandError>;

/// Main error type for i18n-ondemand operations
#[derive(Error, Debug)]
pub enum OnDemandError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for configuration values or inputs
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The async runtime needed for debounce timers is unavailable
    #[error("Runtime error: {message}")]
    Runtime { message: String },

    /// Translation resolver failures
    #[error("Resolver error for {bucket}: {message}")]
    Resolver {
        message: String,
        bucket: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl OnDemandError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new runtime error
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime {
            message: msg.into(),
        }
    }

    /// Create a new resolver error for a bucket
    pub fn resolver(msg: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self::Resolver {
            message: msg.into(),
            bucket: bucket.into(),
            source: None,
        }
    }

    /// Create a new resolver error for a bucket with source
    pub fn resolver_with_source(
        msg: impl Into<String>,
        bucket: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Resolver {
            message: msg.into(),
            bucket: bucket.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether a later flush of the same keys may succeed
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Resolver { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let error = OnDemandError::new("test message");
        assert!(error.to_string().contains("test message"));

        let config_error = OnDemandError::config("config issue");
        assert!(config_error.to_string().contains("Configuration error"));
        assert!(config_error.to_string().contains("config issue"));

        let validation_error = OnDemandError::validation_field("Out of range", "debounce_delay_ms");
        assert!(validation_error.to_string().contains("Validation error"));
        assert!(matches!(
            validation_error,
            OnDemandError::Validation { field: Some(ref f), .. } if f == "debounce_delay_ms"
        ));

        let runtime_error = OnDemandError::runtime("no reactor");
        assert_eq!(runtime_error.to_string(), "Runtime error: no reactor");
    }

    #[test]
    fn test_resolver_error_names_bucket() {
        let error = OnDemandError::resolver("backend unavailable", "en.common");
        assert_eq!(
            error.to_string(),
            "Resolver error for en.common: backend unavailable"
        );
        assert!(error.is_transient());
        assert!(!OnDemandError::config("bad").is_transient());
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = OnDemandError::with_source("Failed to read file", io_error);

        assert!(wrapped_error.to_string().contains("Failed to read file"));
        assert!(wrapped_error.source().is_some());

        let resolver_error = OnDemandError::resolver_with_source(
            "fetch failed",
            "de.admin",
            io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
        );
        assert!(resolver_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: OnDemandError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let invalid_json = r#"{"invalid": json}"#;
        let serde_error = serde_json::from_str::<serde_json::Value>(invalid_json).unwrap_err();
        let error: OnDemandError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_error_chain_preservation() {
        let root_error = io::Error::new(io::ErrorKind::NotFound, "Root cause");
        let middle_error = OnDemandError::config_with_source("Middle layer", root_error);
        let top_error = OnDemandError::with_source("Top layer", middle_error);

        let mut current_error: &dyn std::error::Error = &top_error;
        let mut error_count = 0;

        while let Some(source) = current_error.source() {
            current_error = source;
            error_count += 1;
        }

        assert_eq!(error_count, 2);
    }
}
