//! Fetch-with-cache engine.
//!
//! [`ResourceLoader`] memoizes successful fetches per key, deduplicates
//! concurrent requests for the same key, cancels operations nobody observes
//! any more, and supports a forced re-fetch that bypasses both the cache and
//! deduplication.
//!
//! # Retry policy
//!
//! `retry()` only moves the calling subscription. It evicts the cache entry
//! and the registry entry for its key and registers a new operation; other
//! subscriptions attached to the previous operation stay attached to it and
//! receive its outcome. The superseded operation neither writes the cache nor
//! touches the registry entry of its replacement when it settles. If the
//! retrying subscription was the previous operation's only observer, that
//! operation is aborted.
//!
//! # Example
//!
//! ```ignore
//! let loader = ResourceLoader::new(HttpResourceFetcher::<serde_json::Value>::new()?);
//! let mut posts = loader.subscribe("https://jsonplaceholder.typicode.com/posts");
//! assert!(posts.state().is_loading());
//! let state = posts.settled().await;
//! if state.error().is_some() {
//!     posts.retry();
//! }
//! ```

mod store;
mod subscription;

pub use store::{OperationId, ResourceStore, SubscriptionId};
pub use subscription::Subscription;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn, Instrument};

use crate::domain::errors::FetchError;
use crate::domain::models::ResourceKey;
use crate::domain::ports::ResourceFetcher;

use store::{PendingFetch, Resolution, Subscriber};

/// Subscription-based loader over an injected [`ResourceFetcher`].
///
/// Cloning is cheap; clones share the fetcher and the store. Subscribing,
/// retrying, and changing keys spawn Tokio tasks, so they must be called from
/// within a Tokio runtime.
pub struct ResourceLoader<F: ResourceFetcher> {
    fetcher: Arc<F>,
    store: Arc<ResourceStore<F::Output>>,
}

impl<F: ResourceFetcher + 'static> ResourceLoader<F> {
    /// Create a loader with its own empty store.
    pub fn new(fetcher: F) -> Self {
        Self::with_store(Arc::new(fetcher), Arc::new(ResourceStore::new()))
    }

    /// Create a loader over an existing store, sharing its cache and
    /// in-flight registry with every other loader built on it.
    pub fn with_store(fetcher: Arc<F>, store: Arc<ResourceStore<F::Output>>) -> Self {
        Self { fetcher, store }
    }

    /// Shared cache and in-flight registry.
    pub fn store(&self) -> &Arc<ResourceStore<F::Output>> {
        &self.store
    }

    /// Fetcher used for every operation.
    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Subscribe to `key`.
    ///
    /// The returned state is already `Ready` on a cache hit, `Idle` for an
    /// empty key, and `Loading` otherwise.
    pub fn subscribe(&self, key: impl Into<ResourceKey>) -> Subscription<F> {
        Subscription::new(self.clone(), key.into())
    }

    /// Detach `subscriber` from `previous` and resolve `key` for it under a
    /// fresh generation. Returns the operation it is now attached to.
    pub(crate) fn rebind(
        &self,
        subscriber: &Arc<Subscriber<F::Output>>,
        previous: Option<OperationId>,
        key: &ResourceKey,
        forced: bool,
    ) -> Option<OperationId> {
        let resolution = {
            let mut state = self.store.lock();
            subscriber.advance();
            if let Some(id) = previous {
                state.detach(id, subscriber.id);
            }
            state.resolve(subscriber, key, forced)
        };

        let attached = resolution.operation();
        if let Resolution::Started(pending) = resolution {
            self.launch(pending);
        }
        attached
    }

    /// Drop every claim `subscriber` holds on `previous`.
    pub(crate) fn release(
        &self,
        subscriber: &Arc<Subscriber<F::Output>>,
        previous: Option<OperationId>,
    ) {
        let mut state = self.store.lock();
        subscriber.advance();
        if let Some(id) = previous {
            state.detach(id, subscriber.id);
        }
    }

    fn launch(&self, pending: PendingFetch) {
        let PendingFetch { id, key, cancel } = pending;
        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);
        let span = tracing::info_span!("fetch", operation = %id, key = %key);

        tokio::spawn(
            async move {
                info!("fetch started");
                let result = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(FetchError::Aborted),
                    result = fetcher.fetch(&key, cancel.clone()) => result,
                };

                match &result {
                    Ok(_) => info!("fetch succeeded"),
                    Err(err) if err.is_aborted() => debug!("fetch aborted"),
                    Err(err) => warn!(error = %err, kind = err.kind(), "fetch failed"),
                }
                store.settle(id, result);
            }
            .instrument(span),
        );
    }
}

impl<F: ResourceFetcher> Clone for ResourceLoader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            store: Arc::clone(&self.store),
        }
    }
}

impl<F: ResourceFetcher> fmt::Debug for ResourceLoader<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FetchResult;
    use crate::domain::models::RequestState;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    /// Answers immediately from a fixed table.
    struct TableFetcher {
        responses: HashMap<String, FetchResult<String>>,
        calls: AtomicUsize,
    }

    impl TableFetcher {
        fn new(entries: &[(&str, FetchResult<String>)]) -> Self {
            Self {
                responses: entries
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), v.clone()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResourceFetcher for TableFetcher {
        type Output = String;

        async fn fetch(&self, key: &ResourceKey, _cancel: CancellationToken) -> FetchResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.responses
                .get(key.as_str())
                .cloned()
                .unwrap_or_else(|| Err(FetchError::status(404)))
        }
    }

    #[tokio::test]
    async fn test_empty_key_is_idle_without_fetch() {
        let loader = ResourceLoader::new(TableFetcher::new(&[]));
        let mut sub = loader.subscribe("");

        assert!(matches!(sub.state(), RequestState::Idle));
        sub.retry();
        assert!(matches!(sub.state(), RequestState::Idle));
        assert_eq!(loader.fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn test_success_then_cache_hit() {
        let loader = ResourceLoader::new(TableFetcher::new(&[("/posts", Ok("[1,2]".into()))]));

        let mut first = loader.subscribe("/posts");
        assert!(first.state().is_loading());
        let state = first.settled().await;
        assert_eq!(state.data().map(|v| v.as_str()), Some("[1,2]"));

        let second = loader.subscribe("/posts");
        assert_eq!(second.state().data().map(|v| v.as_str()), Some("[1,2]"));
        assert_eq!(loader.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_surfaces_error() {
        let loader = ResourceLoader::new(TableFetcher::new(&[]));
        let mut sub = loader.subscribe("/missing");

        let state = sub.settled().await;
        assert_eq!(state.error().and_then(FetchError::status_code), Some(404));
        assert!(state.data().is_none());
        assert!(loader.store().cached("/missing").is_none());
        assert!(!loader.store().is_in_flight("/missing"));
    }

    #[tokio::test]
    async fn test_retry_refetches_despite_cache() {
        let loader = ResourceLoader::new(TableFetcher::new(&[("/posts", Ok("v".into()))]));
        let mut sub = loader.subscribe("/posts");
        sub.settled().await;

        sub.retry();
        assert!(sub.state().is_loading());
        assert!(loader.store().cached("/posts").is_none());
        sub.settled().await;

        assert_eq!(loader.fetcher().calls(), 2);
        assert!(loader.store().cached("/posts").is_some());
    }

    #[tokio::test]
    async fn test_shared_store_across_loaders() {
        let store = Arc::new(ResourceStore::new());
        let fetcher = Arc::new(TableFetcher::new(&[("/a", Ok("a".into()))]));
        let first = ResourceLoader::with_store(Arc::clone(&fetcher), Arc::clone(&store));
        let second = ResourceLoader::with_store(Arc::clone(&fetcher), Arc::clone(&store));

        first.subscribe("/a").settled().await;
        let sub = second.subscribe("/a");

        assert_eq!(sub.state().data().map(|v| v.as_str()), Some("a"));
        assert_eq!(fetcher.calls(), 1);
    }
}
