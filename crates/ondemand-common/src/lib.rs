//! # Ondemand Common
//!
//! Shared types, error handling and logging for i18n-ondemand.
//!
//! This crate provides the foundational types and utilities used across
//! all other crates in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{OnDemandError, Result};
pub use types::*;
