//! The surface of the translation runtime that plugins talk to

use ondemand_common::{Result, TranslationMap};
use std::fmt;
use std::sync::Arc;

/// One language or a fallback chain of languages, as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Languages {
    /// A single language code
    One(String),
    /// Several language codes, in lookup order
    Many(Vec<String>),
}

impl Languages {
    /// Language codes in order; a single language becomes a one-element list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(language) => vec![language],
            Self::Many(languages) => languages,
        }
    }

    /// Iterate the language codes in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(language) => std::slice::from_ref(language),
            Self::Many(languages) => languages,
        };
        slice.iter().map(String::as_str)
    }

    /// Number of language codes
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(languages) => languages.len(),
        }
    }

    /// Whether no language is present
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Languages {
    fn from(language: &str) -> Self {
        Self::One(language.to_string())
    }
}

impl From<String> for Languages {
    fn from(language: String) -> Self {
        Self::One(language)
    }
}

impl From<Vec<String>> for Languages {
    fn from(languages: Vec<String>) -> Self {
        Self::Many(languages)
    }
}

impl<const N: usize> From<[&str; N]> for Languages {
    fn from(languages: [&str; N]) -> Self {
        Self::Many(languages.iter().map(ToString::to_string).collect())
    }
}

/// Emitted by the host whenever a lookup finds no translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyEvent {
    /// Languages that were searched
    pub languages: Languages,
    /// Namespace that was searched
    pub namespace: String,
    /// The key that could not be resolved
    pub key: String,
    /// Default value supplied by the caller, or the key itself
    pub fallback_value: String,
}

impl MissingKeyEvent {
    /// Creates a missing key event
    pub fn new(
        languages: impl Into<Languages>,
        namespace: impl Into<String>,
        key: impl Into<String>,
        fallback_value: impl Into<String>,
    ) -> Self {
        Self {
            languages: languages.into(),
            namespace: namespace.into(),
            key: key.into(),
            fallback_value: fallback_value.into(),
        }
    }
}

/// Callback subscribed to missing key events
pub type MissingKeyListener = Arc<dyn Fn(&MissingKeyEvent) + Send + Sync>;

/// Renders the text shown for a key with no translation
pub type MissingKeyRenderer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// What a translation runtime offers to plugins
pub trait TranslationHost: Send + Sync {
    /// Subscribe to missing key notifications
    fn on_missing_key(&self, listener: MissingKeyListener);

    /// Replace how unresolved keys are rendered
    fn set_missing_key_renderer(&self, renderer: MissingKeyRenderer);

    /// Merge translations into the resource store
    fn add_resources(&self, language: &str, namespace: &str, resources: TranslationMap);
}

/// Category a plugin registers under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    /// Loads resources from a backend
    Backend,
    /// Receives log output of the runtime
    Logger,
    /// Any other extension
    ThirdParty,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Backend => "backend",
            Self::Logger => "logger",
            Self::ThirdParty => "3rdParty",
        };
        f.write_str(name)
    }
}

/// An extension the host hands itself to during registration
pub trait TranslationPlugin: Send + Sync {
    /// Registration category
    fn kind(&self) -> PluginKind;

    /// Wire the plugin into the host
    fn init(&self, host: Arc<dyn TranslationHost>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_language_normalizes_to_one_element() {
        let languages = Languages::from("en");
        assert_eq!(languages.len(), 1);
        assert_eq!(languages.into_vec(), vec!["en".to_string()]);
    }

    #[test]
    fn test_language_list_keeps_order() {
        let languages = Languages::from(["de-AT", "de", "en"]);
        assert_eq!(languages.iter().collect::<Vec<_>>(), vec!["de-AT", "de", "en"]);
        assert!(!languages.is_empty());
    }

    #[test]
    fn test_empty_list_is_empty() {
        let languages = Languages::Many(Vec::new());
        assert!(languages.is_empty());
        assert!(languages.into_vec().is_empty());
    }

    #[test]
    fn test_plugin_kind_display() {
        assert_eq!(PluginKind::ThirdParty.to_string(), "3rdParty");
        assert_eq!(PluginKind::Backend.to_string(), "backend");
    }
}
