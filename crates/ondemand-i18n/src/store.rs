//! In-memory resource store: language → namespace → key → translation

use ondemand_common::TranslationMap;
use std::collections::HashMap;
use tracing::debug;

/// Holds every translation known to a [`Translator`](crate::Translator)
#[derive(Debug, Default, Clone)]
pub struct ResourceStore {
    data: HashMap<String, HashMap<String, TranslationMap>>,
}

impl ResourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge translations for a language and namespace, overwriting existing keys
    ///
    /// Returns how many keys were written.
    pub fn add_resources(&mut self, language: &str, namespace: &str, resources: TranslationMap) -> usize {
        let written = resources.len();
        self.data
            .entry(language.to_string())
            .or_default()
            .entry(namespace.to_string())
            .or_default()
            .extend(resources);

        debug!("Added {} resources to {}.{}", written, language, namespace);
        written
    }

    /// Look up a single translation
    pub fn get(&self, language: &str, namespace: &str, key: &str) -> Option<&str> {
        self.data
            .get(language)
            .and_then(|namespaces| namespaces.get(namespace))
            .and_then(|bundle| bundle.get(key))
            .map(String::as_str)
    }

    /// All translations of a language and namespace
    pub fn bundle(&self, language: &str, namespace: &str) -> Option<&TranslationMap> {
        self.data.get(language).and_then(|namespaces| namespaces.get(namespace))
    }

    /// Whether anything was ever added for a language and namespace
    pub fn has_bundle(&self, language: &str, namespace: &str) -> bool {
        self.bundle(language, namespace).is_some()
    }

    /// Languages with at least one bundle, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.data.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Namespaces present for a language, sorted
    pub fn namespaces(&self, language: &str) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self
            .data
            .get(language)
            .map(|namespaces| namespaces.keys().map(String::as_str).collect())
            .unwrap_or_default();
        namespaces.sort_unstable();
        namespaces
    }
}
