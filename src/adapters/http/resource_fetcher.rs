//! reqwest-backed fetcher that decodes JSON bodies.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::{HttpConfig, ResourceKey};
use crate::domain::ports::ResourceFetcher;

/// Fetches resources over HTTP and decodes JSON bodies into `T`.
///
/// Features:
/// - Connection pooling and reuse (via `reqwest::Client`)
/// - Non-2xx statuses reported as transport failures
/// - Body decode failures reported as malformed responses
/// - Cancellation drops the in-flight request
pub struct HttpResourceFetcher<T = serde_json::Value> {
    client: Client,
    _output: PhantomData<fn() -> T>,
}

impl<T> HttpResourceFetcher<T> {
    /// Create a fetcher with default HTTP settings.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a fetcher from configuration.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone())
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client))
    }

    /// Wrap an already configured client.
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            _output: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> HttpResourceFetcher<T> {
    async fn request(&self, url: &str) -> FetchResult<T> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "non-success status");
            return Err(FetchError::status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|err| FetchError::malformed(err.to_string()))
    }
}

#[async_trait]
impl<T> ResourceFetcher for HttpResourceFetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    type Output = T;

    async fn fetch(&self, key: &ResourceKey, cancel: CancellationToken) -> FetchResult<T> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Aborted),
            result = self.request(key.as_str()) => result,
        }
    }
}

impl<T> Clone for HttpResourceFetcher<T> {
    fn clone(&self) -> Self {
        Self::with_client(self.client.clone())
    }
}

impl<T> fmt::Debug for HttpResourceFetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResourceFetcher").finish_non_exhaustive()
    }
}

/// Classify a reqwest failure that happened before a status was available.
fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_decode() {
        return FetchError::malformed(err.to_string());
    }
    match err.status() {
        Some(status) => FetchError::status(status.as_u16()),
        None => FetchError::transport(err.to_string()),
    }
}
