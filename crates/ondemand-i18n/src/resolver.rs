//! The injected backend that turns missing keys into translations

use crate::queue::PendingKeys;
use async_trait::async_trait;
use futures::FutureExt;
use ondemand_common::{BucketKey, OnDemandError, TranslationMap};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;

/// Why a resolver call produced no translations
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The backend refused the request
    #[error("Resolver rejected the request: {0}")]
    Rejected(String),

    /// The backend failed with an underlying error
    #[error("Resolver backend failed: {message}")]
    Backend {
        /// What the backend was doing
        message: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The call exceeded the configured timeout
    #[error("Resolver timed out after {0:?}")]
    TimedOut(Duration),

    /// The resolver panicked
    #[error("Resolver panicked: {0}")]
    Panicked(String),
}

impl ResolverError {
    /// Create a rejection with a message
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Wrap a backend error
    pub fn backend(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            message: msg.into(),
            source: Box::new(source),
        }
    }

    /// Convert into the workspace error, naming the bucket it happened for
    ///
    /// A panic is a bug in the resolver rather than a backend hiccup and
    /// becomes a runtime error.
    pub fn into_error(self, bucket: &BucketKey) -> OnDemandError {
        match self {
            Self::Panicked(message) => {
                OnDemandError::runtime(format!("resolver for {bucket} panicked: {message}"))
            }
            other => OnDemandError::resolver_with_source(
                "translation fetch failed",
                bucket.to_string(),
                other,
            ),
        }
    }
}

/// Result of a resolver call
pub type ResolverResult<T> = Result<T, ResolverError>;

/// Everything a resolver gets to fetch one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Missing keys in the order they were first reported
    pub keys: Vec<String>,
    /// Language code
    pub language: String,
    /// Namespace
    pub namespace: String,
    /// Default value reported with each key
    pub default_values: PendingKeys,
}

impl ResolveRequest {
    /// Build a request from a bucket's pending keys
    pub fn new(bucket: &BucketKey, default_values: PendingKeys) -> Self {
        Self {
            keys: default_values.keys().cloned().collect(),
            language: bucket.language.clone(),
            namespace: bucket.namespace.clone(),
            default_values,
        }
    }

    /// The bucket this request belongs to
    pub fn bucket(&self) -> BucketKey {
        BucketKey::new(&self.language, &self.namespace)
    }
}

/// Fetches translations for a batch of missing keys
///
/// Implementations may use HTTP, files, a database or anything else. Keys
/// left out of the returned map stay unresolved until a later flush.
#[async_trait]
pub trait TranslationResolver: Send + Sync {
    /// Resolve one bucket's keys
    async fn resolve(&self, request: ResolveRequest) -> ResolverResult<TranslationMap>;
}

/// Adapts an async closure into a [`TranslationResolver`]
pub struct FnResolver<F> {
    func: F,
}

impl<F> std::fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}

/// Wrap an async closure as a resolver
///
/// ```rust
/// use ondemand_i18n::{resolver_fn, ResolveRequest, ResolverError};
/// use std::collections::HashMap;
///
/// let resolver = resolver_fn(|request: ResolveRequest| async move {
///     let translated: HashMap<String, String> = request
///         .keys
///         .into_iter()
///         .map(|key| (key.clone(), key.to_uppercase()))
///         .collect();
///     Ok::<_, ResolverError>(translated)
/// });
/// # let _ = resolver;
/// ```
pub fn resolver_fn<F, Fut>(func: F) -> FnResolver<F>
where
    F: Fn(ResolveRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolverResult<TranslationMap>> + Send + 'static,
{
    FnResolver { func }
}

#[async_trait]
impl<F, Fut> TranslationResolver for FnResolver<F>
where
    F: Fn(ResolveRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ResolverResult<TranslationMap>> + Send + 'static,
{
    async fn resolve(&self, request: ResolveRequest) -> ResolverResult<TranslationMap> {
        (self.func)(request).await
    }
}

/// Call the resolver, turning an elapsed timeout into [`ResolverError::TimedOut`]
/// and a panic into [`ResolverError::Panicked`]
pub async fn invoke(
    resolver: &dyn TranslationResolver,
    request: ResolveRequest,
    timeout: Option<Duration>,
) -> ResolverResult<TranslationMap> {
    let call = AssertUnwindSafe(resolver.resolve(request)).catch_unwind();
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => return Err(ResolverError::TimedOut(limit)),
        },
        None => call.await,
    };
    outcome.unwrap_or_else(|payload| Err(ResolverError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ondemand_common::test_utils::translation_map;
    use std::error::Error;

    fn request() -> ResolveRequest {
        let mut defaults = PendingKeys::new();
        defaults.insert("b".to_string(), "B".to_string());
        defaults.insert("a".to_string(), "A".to_string());
        ResolveRequest::new(&BucketKey::new("en", "common"), defaults)
    }

    #[test]
    fn test_request_keys_follow_report_order() {
        let request = request();
        assert_eq!(request.keys, vec!["b", "a"]);
        assert_eq!(request.bucket(), BucketKey::new("en", "common"));
        assert_eq!(request.default_values.get("a").map(String::as_str), Some("A"));
    }

    #[tokio::test]
    async fn test_closure_resolver() {
        let resolver = resolver_fn(|request: ResolveRequest| async move {
            let translated: TranslationMap = request
                .default_values
                .into_iter()
                .map(|(key, default)| (key, default.to_lowercase()))
                .collect();
            Ok::<_, ResolverError>(translated)
        });

        let result = invoke(&resolver, request(), None).await.unwrap();
        assert_eq!(result, translation_map([("a", "a"), ("b", "b")]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_turns_into_error() {
        let resolver = resolver_fn(|_request: ResolveRequest| async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, ResolverError>(TranslationMap::new())
        });

        let err = invoke(&resolver, request(), Some(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolverError::TimedOut(limit) if limit == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_panic_turns_into_error() {
        let resolver = resolver_fn(|request: ResolveRequest| async move {
            if request.keys.len() > 1 {
                panic!("cannot handle {} keys", request.keys.len());
            }
            Ok::<_, ResolverError>(TranslationMap::new())
        });

        let err = invoke(&resolver, request(), None).await.unwrap_err();
        assert!(matches!(err, ResolverError::Panicked(ref message) if message == "cannot handle 2 keys"));

        let converted = err.into_error(&BucketKey::new("en", "common"));
        assert!(!converted.is_transient());
        assert!(converted.to_string().contains("en.common"));
    }

    #[test]
    fn test_error_conversion_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ResolverError::backend("GET /locales failed", io);
        assert!(err.source().is_some());

        let converted = err.into_error(&BucketKey::new("en", "common"));
        assert!(converted.to_string().contains("en.common"));
        assert!(converted.source().is_some());
        assert!(converted.is_transient());
    }
}
