//! In-memory translation runtime implementing [`TranslationHost`]

use crate::host::{
    Languages, MissingKeyEvent, MissingKeyListener, MissingKeyRenderer, TranslationHost,
    TranslationPlugin,
};
use crate::store::ResourceStore;
use ondemand_common::{Result, TranslationMap};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Construction options of a [`Translator`]
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    /// Active language
    pub language: String,
    /// Languages searched after the active one, in order
    pub fallback_languages: Vec<String>,
    /// Namespace used when a lookup names none
    pub default_namespace: String,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            fallback_languages: Vec::new(),
            default_namespace: "translation".to_string(),
        }
    }
}

/// Per-lookup overrides
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Language to use instead of the active one
    pub language: Option<String>,
    /// Namespace to use instead of the default one
    pub namespace: Option<String>,
    /// Text reported as fallback value when the key is missing
    pub default_value: Option<String>,
}

impl TranslateOptions {
    /// Options with only a namespace set
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Set the language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the default value
    #[must_use]
    pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// A small translation runtime: resource store, language fallback and
/// missing key notifications
pub struct Translator {
    language: RwLock<String>,
    fallback_languages: Vec<String>,
    default_namespace: String,
    store: RwLock<ResourceStore>,
    listeners: RwLock<Vec<MissingKeyListener>>,
    renderer: RwLock<Option<MissingKeyRenderer>>,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("language", &*self.language.read())
            .field("fallback_languages", &self.fallback_languages)
            .field("default_namespace", &self.default_namespace)
            .field("listeners", &self.listeners.read().len())
            .field("has_renderer", &self.renderer.read().is_some())
            .finish_non_exhaustive()
    }
}

impl Translator {
    /// Create a translator shared behind an [`Arc`], as plugins require
    pub fn new(options: TranslatorOptions) -> Arc<Self> {
        info!(
            "Translator initialized with language {} and namespace {}",
            options.language, options.default_namespace
        );
        Arc::new(Self {
            language: RwLock::new(options.language),
            fallback_languages: options.fallback_languages,
            default_namespace: options.default_namespace,
            store: RwLock::new(ResourceStore::new()),
            listeners: RwLock::new(Vec::new()),
            renderer: RwLock::new(None),
        })
    }

    /// Register a plugin, handing it this translator as host
    pub fn use_plugin(self: &Arc<Self>, plugin: &dyn TranslationPlugin) -> Result<()> {
        debug!("Registering {} plugin", plugin.kind());
        let host: Arc<dyn TranslationHost> = self.clone();
        plugin.init(host)
    }

    /// Active language
    pub fn language(&self) -> String {
        self.language.read().clone()
    }

    /// Switch the active language
    pub fn change_language(&self, language: impl Into<String>) {
        let language = language.into();
        info!("Changing language to {}", language);
        *self.language.write() = language;
    }

    /// Namespace used when a lookup names none
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// Translate a key in the active language and default namespace
    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &TranslateOptions::default())
    }

    /// Translate a key with per-lookup overrides
    ///
    /// Searches the requested language then each fallback language. When no
    /// translation exists, listeners receive one [`MissingKeyEvent`] for the
    /// whole chain and the installed renderer decides the returned text.
    pub fn t_with(&self, key: &str, options: &TranslateOptions) -> String {
        let languages = self.language_chain(options);
        let namespace = options
            .namespace
            .clone()
            .unwrap_or_else(|| self.default_namespace.clone());

        if let Some(found) = self.lookup(&languages, &namespace, key) {
            return found;
        }

        let fallback_value = options.default_value.clone().unwrap_or_else(|| key.to_string());
        let languages = if languages.len() == 1 {
            Languages::One(languages.into_iter().next().unwrap_or_default())
        } else {
            Languages::Many(languages)
        };
        self.emit_missing_key(&MissingKeyEvent::new(
            languages,
            namespace,
            key,
            fallback_value.clone(),
        ));

        let renderer = self.renderer.read().clone();
        renderer.map_or(fallback_value, |render| render(key))
    }

    /// Whether a translation exists in the language chain, without notifying listeners
    pub fn exists(&self, key: &str, options: &TranslateOptions) -> bool {
        let namespace = options.namespace.as_deref().unwrap_or(&self.default_namespace);
        self.lookup(&self.language_chain(options), namespace, key).is_some()
    }

    /// Read a stored translation directly
    pub fn get_resource(&self, language: &str, namespace: &str, key: &str) -> Option<String> {
        self.store.read().get(language, namespace, key).map(ToString::to_string)
    }

    /// Whether anything was ever added for a language and namespace
    pub fn has_resource_bundle(&self, language: &str, namespace: &str) -> bool {
        self.store.read().has_bundle(language, namespace)
    }

    /// Languages that have any resources, sorted
    pub fn loaded_languages(&self) -> Vec<String> {
        self.store.read().languages().into_iter().map(ToString::to_string).collect()
    }

    /// Namespaces loaded for a language, sorted
    pub fn loaded_namespaces(&self, language: &str) -> Vec<String> {
        self.store
            .read()
            .namespaces(language)
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Number of registered missing key listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    fn language_chain(&self, options: &TranslateOptions) -> Vec<String> {
        let primary = options.language.clone().unwrap_or_else(|| self.language());
        let mut chain = vec![primary];
        for fallback in &self.fallback_languages {
            if !chain.contains(fallback) {
                chain.push(fallback.clone());
            }
        }
        chain
    }

    fn lookup(&self, languages: &[String], namespace: &str, key: &str) -> Option<String> {
        let store = self.store.read();
        languages
            .iter()
            .find_map(|language| store.get(language, namespace, key))
            .map(ToString::to_string)
    }

    fn emit_missing_key(&self, event: &MissingKeyEvent) {
        // Listeners run without any translator lock held.
        let listeners: Vec<MissingKeyListener> = self.listeners.read().clone();
        debug!(
            "Missing key {} in {:?}/{} ({} listeners)",
            event.key,
            event.languages,
            event.namespace,
            listeners.len()
        );
        for listener in listeners {
            listener(event);
        }
    }
}

impl TranslationHost for Translator {
    fn on_missing_key(&self, listener: MissingKeyListener) {
        self.listeners.write().push(listener);
    }

    fn set_missing_key_renderer(&self, renderer: MissingKeyRenderer) {
        *self.renderer.write() = Some(renderer);
    }

    fn add_resources(&self, language: &str, namespace: &str, resources: TranslationMap) {
        let written = self.store.write().add_resources(language, namespace, resources);
        debug!("Added {} translations to {}/{}", written, language, namespace);
    }
}
