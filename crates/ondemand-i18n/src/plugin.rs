//! The on-demand key loader plugin
//!
//! Listens for missing keys, batches them per (language, namespace) bucket,
//! waits for a quiet period, asks the resolver for the whole batch and merges
//! the answer into the host.

use crate::debounce::Debouncer;
use crate::host::{MissingKeyEvent, PluginKind, TranslationHost, TranslationPlugin};
use crate::queue::PendingQueue;
use crate::resolver::{self, ResolveRequest, TranslationResolver};
use futures::future::join_all;
use ondemand_common::{BucketKey, OnDemandError, Result};
use ondemand_config::PluginConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// What a flush did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending; the resolver was not called
    Empty,
    /// The resolver answered and its translations were merged
    Resolved {
        /// Keys sent to the resolver
        requested: usize,
        /// Translations returned by the resolver
        resolved: usize,
    },
    /// The resolver failed; the keys stay pending
    Failed {
        /// Keys sent to the resolver
        requested: usize,
        /// Rendered resolver error
        reason: String,
    },
}

impl FlushOutcome {
    /// Whether the resolver call succeeded
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// State that only exists once the plugin is attached to a host
struct Attached {
    host: Weak<dyn TranslationHost>,
    debouncer: Debouncer,
}

struct Shared {
    resolver: Arc<dyn TranslationResolver>,
    config: PluginConfig,
    queue: Mutex<PendingQueue>,
    attached: OnceLock<Attached>,
    renderer_installed: AtomicBool,
}

/// Loads missing translation keys on demand
///
/// Cheap to clone; clones share the same queue and timers.
///
/// ```rust,no_run
/// use ondemand_i18n::{
///     resolver_fn, KeysOnDemand, ResolveRequest, ResolverError, TranslationMap, Translator,
///     TranslatorOptions,
/// };
///
/// # async fn example() -> ondemand_i18n::Result<()> {
/// let plugin = KeysOnDemand::new(resolver_fn(|request: ResolveRequest| async move {
///     // fetch `request.keys` for `request.language` / `request.namespace`
///     Ok::<_, ResolverError>(TranslationMap::new())
/// }));
///
/// let translator = Translator::new(TranslatorOptions::default());
/// translator.use_plugin(&plugin)?;
///
/// // renders the placeholder now, the fetched text once the batch resolves
/// let _ = translator.t("greeting");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KeysOnDemand {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for KeysOnDemand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeysOnDemand")
            .field("config", &self.shared.config)
            .field("attached", &self.is_initialized())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl KeysOnDemand {
    /// Create the plugin with default settings
    pub fn new(resolver: impl TranslationResolver + 'static) -> Self {
        Self::build(Arc::new(resolver), PluginConfig::default())
    }

    /// Create the plugin with explicit settings
    pub fn with_config(
        resolver: impl TranslationResolver + 'static,
        config: PluginConfig,
    ) -> Result<Self> {
        Self::from_shared(Arc::new(resolver), config)
    }

    /// Create the plugin around a resolver that is shared with other code
    pub fn from_shared(resolver: Arc<dyn TranslationResolver>, config: PluginConfig) -> Result<Self> {
        config.validate_settings()?;
        Ok(Self::build(resolver, config))
    }

    fn build(resolver: Arc<dyn TranslationResolver>, config: PluginConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                resolver,
                config,
                queue: Mutex::new(PendingQueue::new()),
                attached: OnceLock::new(),
                renderer_installed: AtomicBool::new(false),
            }),
        }
    }

    /// Settings the plugin was built with
    pub fn config(&self) -> &PluginConfig {
        &self.shared.config
    }

    /// Attach to a host and start listening for missing keys
    ///
    /// Must be called from within a tokio runtime; debounce timers run on it.
    /// A plugin attaches to one host only.
    pub fn init(&self, host: Arc<dyn TranslationHost>) -> Result<()> {
        let runtime = Handle::try_current()
            .map_err(|e| OnDemandError::runtime(format!("debounce timers need a tokio runtime: {e}")))?;

        let debouncer = Debouncer::new(self.shared.config.debounce_delay(), runtime);
        let delay = debouncer.delay();
        let attached = Attached {
            host: Arc::downgrade(&host),
            debouncer,
        };
        if self.shared.attached.set(attached).is_err() {
            return Err(OnDemandError::config("plugin is already attached to a host"));
        }

        let shared = Arc::clone(&self.shared);
        host.on_missing_key(Arc::new(move |event: &MissingKeyEvent| {
            shared.handle_missing_key(event);
        }));

        info!(
            "Keys on demand attached (debounce {:?}, placeholder {:?})",
            delay,
            self.shared.config.missing_key_placeholder
        );
        Ok(())
    }

    /// Whether [`init`](Self::init) succeeded
    pub fn is_initialized(&self) -> bool {
        self.shared.attached.get().is_some()
    }

    /// Record a missing key and (re)arm its bucket's timer
    pub fn enqueue(&self, key: &str, language: &str, namespace: &str, default_value: &str) {
        self.shared.request_key(key, language, namespace, default_value);
    }

    /// Send a bucket's pending keys to the resolver right away
    ///
    /// Cancels the bucket's debounce timer; keys reported afterwards arm it again.
    pub async fn flush(&self, language: &str, namespace: &str) -> FlushOutcome {
        let bucket = BucketKey::new(language, namespace);
        if let Some(attached) = self.shared.attached.get() {
            attached.debouncer.cancel(&bucket);
        }
        self.shared.flush(&bucket).await
    }

    /// Flush every bucket that holds keys, concurrently
    ///
    /// Outcomes are sorted by bucket.
    pub async fn flush_all(&self) -> Vec<(BucketKey, FlushOutcome)> {
        let buckets = self.shared.queue.lock().non_empty_buckets();
        let flushes = buckets.into_iter().map(|bucket| async move {
            let outcome = self.shared.flush(&bucket).await;
            (bucket, outcome)
        });
        join_all(flushes).await
    }

    /// Keys waiting for the next flush of a bucket, in report order
    ///
    /// Keys of a flush that is still in flight are not included.
    pub fn pending_keys(&self, language: &str, namespace: &str) -> Vec<String> {
        self.shared.queue.lock().keys(&BucketKey::new(language, namespace))
    }

    /// Keys waiting across all buckets
    pub fn pending_count(&self) -> usize {
        self.shared.queue.lock().pending_count()
    }

    /// Buckets seen so far; they are emptied, never removed
    pub fn bucket_count(&self) -> usize {
        self.shared.queue.lock().bucket_count()
    }

    /// Whether a bucket's debounce timer is waiting to fire
    pub fn is_armed(&self, language: &str, namespace: &str) -> bool {
        self.shared.attached.get().is_some_and(|attached| {
            attached
                .debouncer
                .is_armed(&BucketKey::new(language, namespace))
        })
    }
}

impl TranslationPlugin for KeysOnDemand {
    fn kind(&self) -> PluginKind {
        PluginKind::ThirdParty
    }

    fn init(&self, host: Arc<dyn TranslationHost>) -> Result<()> {
        Self::init(self, host)
    }
}

impl Shared {
    fn host(&self) -> Option<Arc<dyn TranslationHost>> {
        self.attached.get().and_then(|attached| attached.host.upgrade())
    }

    fn handle_missing_key(self: &Arc<Self>, event: &MissingKeyEvent) {
        self.install_renderer();
        for language in event.languages.iter() {
            self.request_key(&event.key, language, &event.namespace, &event.fallback_value);
        }
    }

    fn install_renderer(&self) {
        if self.renderer_installed.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(host) = self.host() else {
            self.renderer_installed.store(false, Ordering::Release);
            return;
        };

        let placeholder = self.config.missing_key_placeholder.clone();
        host.set_missing_key_renderer(Arc::new(move |_key: &str| placeholder.clone()));
        debug!("Installed missing key renderer");
    }

    fn request_key(self: &Arc<Self>, key: &str, language: &str, namespace: &str, default_value: &str) {
        let bucket = BucketKey::new(language, namespace);
        let added = self.queue.lock().enqueue(&bucket, key, default_value);
        debug!(
            "Queued key {} for {} ({})",
            key,
            bucket,
            if added { "new" } else { "updated" }
        );

        let Some(attached) = self.attached.get() else {
            debug!("Not attached to a host yet, {} waits for a manual flush", bucket);
            return;
        };

        let shared = Arc::clone(self);
        let target = bucket.clone();
        attached.debouncer.arm(&bucket, move || async move {
            shared.flush(&target).await;
        });
    }

    async fn flush(&self, bucket: &BucketKey) -> FlushOutcome {
        let snapshot = self.queue.lock().take(bucket);
        if snapshot.is_empty() {
            debug!("Nothing pending for {}", bucket);
            return FlushOutcome::Empty;
        }

        let requested = snapshot.len();
        debug!("Flushing {} keys for {}", requested, bucket);
        let request = ResolveRequest::new(bucket, snapshot.keys().clone());

        match resolver::invoke(self.resolver.as_ref(), request, self.config.resolver_timeout()).await {
            Ok(translations) => {
                let resolved = translations.len();
                match self.host() {
                    Some(host) => host.add_resources(bucket.language(), bucket.namespace(), translations),
                    None => warn!("Host is gone, dropping {} translations for {}", resolved, bucket),
                }
                self.queue.lock().complete(bucket, &snapshot);
                info!("Resolved {} of {} keys for {}", resolved, requested, bucket);
                FlushOutcome::Resolved { requested, resolved }
            }
            Err(err) => {
                let err = err.into_error(bucket);
                if err.is_transient() {
                    warn!("{}; keeping {} keys pending", err, requested);
                } else {
                    error!("{}; keeping {} keys pending", err, requested);
                }
                self.queue.lock().restore(bucket, snapshot);
                FlushOutcome::Failed {
                    requested,
                    reason: err.to_string(),
                }
            }
        }
    }
}
