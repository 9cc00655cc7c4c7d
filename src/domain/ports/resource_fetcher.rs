//! Resource fetcher port.
//!
//! Defines the asynchronous "fetch resource by key" operation the loader
//! engine is built on.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::FetchResult;
use crate::domain::models::ResourceKey;

/// Loads a single resource by key.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Decoded value produced by a successful fetch.
    type Output: Send + Sync + 'static;

    /// Fetch the resource named by `key`.
    ///
    /// Implementations should stop work and return
    /// [`FetchError::Aborted`](crate::domain::errors::FetchError::Aborted)
    /// once `cancel` fires. Non-success transport outcomes map to
    /// `Transport`, undecodable bodies to `MalformedResponse`.
    async fn fetch(&self, key: &ResourceKey, cancel: CancellationToken)
        -> FetchResult<Self::Output>;
}

#[async_trait]
impl<F: ResourceFetcher + ?Sized> ResourceFetcher for Arc<F> {
    type Output = F::Output;

    async fn fetch(
        &self,
        key: &ResourceKey,
        cancel: CancellationToken,
    ) -> FetchResult<Self::Output> {
        (**self).fetch(key, cancel).await
    }
}
