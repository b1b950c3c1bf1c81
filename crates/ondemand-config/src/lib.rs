//! # Ondemand Config
//!
//! Validated configuration for the i18n-ondemand plugin.
//!
//! This crate provides the configuration schema, its defaults, and a YAML
//! loader with environment variable overrides.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::*;
