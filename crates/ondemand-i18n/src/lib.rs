//! # Ondemand I18n
//!
//! Loads translation keys lazily. Instead of shipping every translation up
//! front, the [`KeysOnDemand`] plugin waits for the translation runtime to
//! report keys it cannot find, collects them per language and namespace,
//! and hands each batch to a [`TranslationResolver`] once reports stop
//! arriving for a short while. Resolved translations are merged back into
//! the runtime; until then a configurable placeholder is rendered.
//!
//! ## Features
//!
//! - One resolver call per (language, namespace) batch
//! - Per-bucket debounce, reset by every new report
//! - Failed batches stay pending and are retried with the next batch
//! - A small in-memory [`Translator`] with language fallback to host the plugin

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod debounce;
pub mod host;
pub mod plugin;
pub mod queue;
pub mod resolver;
pub mod store;
pub mod translator;

pub use debounce::Debouncer;
pub use host::{
    Languages, MissingKeyEvent, MissingKeyListener, MissingKeyRenderer, PluginKind,
    TranslationHost, TranslationPlugin,
};
pub use plugin::{FlushOutcome, KeysOnDemand};
pub use queue::{PendingKeys, PendingQueue, Snapshot};
pub use resolver::{
    resolver_fn, FnResolver, ResolveRequest, ResolverError, ResolverResult, TranslationResolver,
};
pub use store::ResourceStore;
pub use translator::{TranslateOptions, Translator, TranslatorOptions};

pub use ondemand_common::{BucketKey, OnDemandError, Result, TranslationMap};
pub use ondemand_config::PluginConfig;
