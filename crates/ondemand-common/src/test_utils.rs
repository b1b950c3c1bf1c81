//! Test utilities and shared test helpers.
//!
//! Enabled for unit tests and, for other crates, through the `testing` feature.

use crate::types::TranslationMap;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Build a [`TranslationMap`] from string pairs.
pub fn translation_map<const N: usize>(pairs: [(&str, &str); N]) -> TranslationMap {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
