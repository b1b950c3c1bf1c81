//! Common type definitions shared across the workspace.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Translations returned by a resolver: key to translated string.
pub type TranslationMap = HashMap<String, String>;

/// Identifies one (language, namespace) pair whose missing keys are batched together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketKey {
    /// Language code, e.g. `en` or `pt-BR`.
    pub language: String,
    /// Translation namespace, e.g. `common`.
    pub namespace: String,
}

impl BucketKey {
    /// Creates a bucket key for the given language and namespace.
    pub fn new(language: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            namespace: namespace.into(),
        }
    }

    /// Language component.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Namespace component.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.language, self.namespace)
    }
}

impl<L: Into<String>, N: Into<String>> From<(L, N)> for BucketKey {
    fn from((language, namespace): (L, N)) -> Self {
        Self::new(language, namespace)
    }
}
