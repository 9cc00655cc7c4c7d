//! Per-view handle onto a resource key.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::store::{OperationId, Subscriber, SubscriptionId};
use super::ResourceLoader;
use crate::domain::models::{RequestState, ResourceKey};
use crate::domain::ports::ResourceFetcher;

/// A view's live interest in one resource key.
///
/// Dropping the subscription unsubscribes it: the state stops updating and,
/// if it was the only observer of a pending fetch, that fetch is aborted.
pub struct Subscription<F: ResourceFetcher + 'static> {
    loader: ResourceLoader<F>,
    subscriber: Arc<Subscriber<F::Output>>,
    receiver: watch::Receiver<RequestState<F::Output>>,
    key: ResourceKey,
    attached: Option<OperationId>,
}

impl<F: ResourceFetcher + 'static> Subscription<F> {
    pub(super) fn new(loader: ResourceLoader<F>, key: ResourceKey) -> Self {
        let (subscriber, receiver) = loader.store().register();
        let attached = loader.rebind(&subscriber, None, &key, false);
        debug!(subscription = %subscriber.id, key = %key, "subscribed");

        Self {
            loader,
            subscriber,
            receiver,
            key,
            attached,
        }
    }

    /// Identity of this subscription.
    pub fn id(&self) -> SubscriptionId {
        self.subscriber.id
    }

    /// The key currently requested.
    pub const fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState<F::Output> {
        self.receiver.borrow().clone()
    }

    /// A receiver views can hold on to and await independently.
    pub fn watch(&self) -> watch::Receiver<RequestState<F::Output>> {
        self.receiver.clone()
    }

    /// Wait for the next state change and return it.
    pub async fn changed(&mut self) -> RequestState<F::Output> {
        if let Err(err) = self.receiver.changed().await {
            debug!(subscription = %self.subscriber.id, error = %err, "state channel closed");
        }
        self.receiver.borrow_and_update().clone()
    }

    /// Wait until the state is anything but `Loading`.
    pub async fn settled(&mut self) -> RequestState<F::Output> {
        let settled = self
            .receiver
            .wait_for(RequestState::is_settled)
            .await
            .map(|state| state.clone());
        settled.unwrap_or_else(|_| self.receiver.borrow().clone())
    }

    /// Force a fresh fetch of the current key, bypassing cache and
    /// deduplication. No-op when the key is empty.
    pub fn retry(&mut self) {
        if self.key.is_empty() {
            return;
        }
        info!(subscription = %self.subscriber.id, key = %self.key, "retry requested");
        self.attached = self
            .loader
            .rebind(&self.subscriber, self.attached.take(), &self.key, true);
    }

    /// Point the subscription at a different key.
    ///
    /// Interest in the previous key is dropped first. Setting the key it
    /// already has does nothing.
    pub fn set_key(&mut self, key: impl Into<ResourceKey>) {
        let key = key.into();
        if key == self.key {
            return;
        }
        debug!(subscription = %self.subscriber.id, from = %self.key, to = %key, "key changed");
        self.attached = self
            .loader
            .rebind(&self.subscriber, self.attached.take(), &key, false);
        self.key = key;
    }

    /// Stop observing. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl<F: ResourceFetcher + 'static> Drop for Subscription<F> {
    fn drop(&mut self) {
        self.loader.release(&self.subscriber, self.attached.take());
        debug!(subscription = %self.subscriber.id, key = %self.key, "unsubscribed");
    }
}

impl<F> fmt::Debug for Subscription<F>
where
    F: ResourceFetcher + 'static,
    F::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.subscriber.id)
            .field("key", &self.key)
            .field("state", &*self.receiver.borrow())
            .finish_non_exhaustive()
    }
}
