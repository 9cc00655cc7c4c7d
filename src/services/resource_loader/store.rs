//! Shared cache and in-flight registry.
//!
//! A [`ResourceStore`] is the process-wide state behind every loader built on
//! it: the cache of successful results, the registry mapping each key to its
//! single in-flight operation, and the observers attached to each operation.
//! One mutex guards all three so that registry removal on settlement happens
//! before any later resolution of the same key can observe the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::errors::FetchResult;
use crate::domain::models::{RequestState, ResourceKey};

/// Identifier of one network operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// Identifier of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Delivery end of a subscription.
///
/// The generation counter is the ownership token: every subscribe, key
/// change, retry, and unsubscribe advances it, and an operation may only
/// publish to the subscriber if the generation it recorded at attach time is
/// still current.
pub(crate) struct Subscriber<T> {
    pub(crate) id: SubscriptionId,
    generation: AtomicU64,
    sender: watch::Sender<RequestState<T>>,
}

impl<T> Subscriber<T> {
    fn new(id: SubscriptionId) -> (Arc<Self>, watch::Receiver<RequestState<T>>) {
        let (sender, receiver) = watch::channel(RequestState::Idle);
        let subscriber = Arc::new(Self {
            id,
            generation: AtomicU64::new(0),
            sender,
        });
        (subscriber, receiver)
    }

    /// Mint a new generation, invalidating every earlier attachment.
    pub(crate) fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn publish(&self, state: RequestState<T>) {
        self.sender.send_replace(state);
    }

    fn deliver(&self, generation: u64, state: &RequestState<T>) -> bool {
        if self.generation() != generation {
            return false;
        }
        self.publish(state.clone());
        true
    }
}

struct Observer<T> {
    subscriber: Arc<Subscriber<T>>,
    generation: u64,
}

struct Operation<T> {
    key: ResourceKey,
    cancel: CancellationToken,
    observers: Vec<Observer<T>>,
}

/// A freshly registered operation the loader still has to drive.
pub(crate) struct PendingFetch {
    pub(crate) id: OperationId,
    pub(crate) key: ResourceKey,
    pub(crate) cancel: CancellationToken,
}

/// How a key was resolved for one subscriber.
pub(crate) enum Resolution {
    /// Empty key; nothing to fetch.
    Idle,
    /// Served from the cache.
    Cached,
    /// Attached to an operation already in flight.
    Attached(OperationId),
    /// A new operation was registered and must be launched.
    Started(PendingFetch),
}

impl Resolution {
    pub(crate) const fn operation(&self) -> Option<OperationId> {
        match self {
            Self::Attached(id) => Some(*id),
            Self::Started(pending) => Some(pending.id),
            Self::Idle | Self::Cached => None,
        }
    }
}

pub(crate) struct StoreState<T> {
    cache: HashMap<ResourceKey, Arc<T>>,
    in_flight: HashMap<ResourceKey, OperationId>,
    operations: HashMap<OperationId, Operation<T>>,
    next_operation: u64,
}

impl<T> StoreState<T> {
    /// Run the resolution algorithm for `key` on behalf of `subscriber`.
    ///
    /// A forced resolution evicts the cache entry and the registry entry for
    /// the key first, so it always registers a new operation. Operations that
    /// lose their registry entry this way keep running for the observers still
    /// attached to them.
    pub(crate) fn resolve(
        &mut self,
        subscriber: &Arc<Subscriber<T>>,
        key: &ResourceKey,
        forced: bool,
    ) -> Resolution {
        if key.is_empty() {
            subscriber.publish(RequestState::Idle);
            return Resolution::Idle;
        }

        if forced {
            self.cache.remove(key);
            if let Some(previous) = self.in_flight.remove(key) {
                debug!(key = %key, operation = %previous, "retry superseded in-flight operation");
            }
        } else if let Some(value) = self.cache.get(key) {
            debug!(key = %key, subscription = %subscriber.id, "cache hit");
            subscriber.publish(RequestState::Ready(Arc::clone(value)));
            return Resolution::Cached;
        }

        subscriber.publish(RequestState::Loading);
        let observer = Observer {
            subscriber: Arc::clone(subscriber),
            generation: subscriber.generation(),
        };

        if let Some(&id) = self.in_flight.get(key) {
            if let Some(operation) = self.operations.get_mut(&id) {
                operation.observers.push(observer);
                debug!(
                    key = %key,
                    operation = %id,
                    subscription = %subscriber.id,
                    observers = operation.observers.len(),
                    "attached to in-flight operation"
                );
                return Resolution::Attached(id);
            }
        }

        self.next_operation += 1;
        let id = OperationId(self.next_operation);
        let cancel = CancellationToken::new();
        self.operations.insert(
            id,
            Operation {
                key: key.clone(),
                cancel: cancel.clone(),
                observers: vec![observer],
            },
        );
        self.in_flight.insert(key.clone(), id);

        Resolution::Started(PendingFetch {
            id,
            key: key.clone(),
            cancel,
        })
    }

    /// Remove a subscription from an operation.
    ///
    /// When the last observer leaves, the operation is cancelled and its
    /// registry entry dropped so later requesters start a fresh fetch.
    pub(crate) fn detach(&mut self, id: OperationId, subscription: SubscriptionId) {
        let Some(operation) = self.operations.get_mut(&id) else {
            return;
        };

        operation
            .observers
            .retain(|observer| observer.subscriber.id != subscription);
        if !operation.observers.is_empty() {
            return;
        }

        operation.cancel.cancel();
        let key = operation.key.clone();
        if self.in_flight.get(&key) == Some(&id) {
            self.in_flight.remove(&key);
        }
        debug!(key = %key, operation = %id, "last observer detached, aborting operation");
    }

    /// Apply the outcome of an operation and notify its observers.
    fn settle(&mut self, id: OperationId, result: FetchResult<T>) -> usize {
        let Some(operation) = self.operations.remove(&id) else {
            return 0;
        };

        let registered = self.in_flight.get(&operation.key) == Some(&id);
        if registered {
            self.in_flight.remove(&operation.key);
        }

        let state = match result {
            Ok(value) => {
                let value = Arc::new(value);
                if registered {
                    self.cache.insert(operation.key.clone(), Arc::clone(&value));
                } else {
                    debug!(key = %operation.key, operation = %id, "superseded operation settled, cache untouched");
                }
                RequestState::Ready(value)
            }
            Err(err) if err.is_aborted() => RequestState::Idle,
            Err(err) => RequestState::Failed(err),
        };

        operation
            .observers
            .iter()
            .filter(|observer| observer.subscriber.deliver(observer.generation, &state))
            .count()
    }
}

/// Process-wide cache and in-flight registry.
///
/// Starts empty and has no teardown. Share one store between loaders with
/// [`ResourceLoader::with_store`](super::ResourceLoader::with_store); create a
/// fresh one per test for isolation.
pub struct ResourceStore<T> {
    state: Mutex<StoreState<T>>,
    next_subscription: AtomicU64,
}

impl<T> ResourceStore<T> {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                cache: HashMap::new(),
                in_flight: HashMap::new(),
                operations: HashMap::new(),
                next_operation: 0,
            }),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Cached value for `key`, if a fetch for it has succeeded.
    pub fn cached(&self, key: &str) -> Option<Arc<T>> {
        self.lock().cache.get(key).cloned()
    }

    /// Whether a registered operation is currently in flight for `key`.
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    /// Number of keys with a registered in-flight operation.
    pub fn in_flight_len(&self) -> usize {
        self.lock().in_flight.len()
    }

    /// Number of cached keys.
    pub fn cache_len(&self) -> usize {
        self.lock().cache.len()
    }

    /// Operations not yet settled, including ones superseded by a retry.
    pub fn pending_operations(&self) -> usize {
        self.lock().operations.len()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, StoreState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self) -> (Arc<Subscriber<T>>, watch::Receiver<RequestState<T>>) {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed) + 1);
        Subscriber::new(id)
    }

    pub(crate) fn settle(&self, id: OperationId, result: FetchResult<T>) {
        let delivered = self.lock().settle(id, result);
        debug!(operation = %id, delivered, "operation settled");
    }
}

impl<T> Default for ResourceStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ResourceStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ResourceStore")
            .field("cached", &state.cache.len())
            .field("in_flight", &state.in_flight.len())
            .field("operations", &state.operations.len())
            .finish()
    }
}
