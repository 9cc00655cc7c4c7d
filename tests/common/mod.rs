//! Common test utilities for integration tests
//!
//! Provides a scripted fetcher whose calls are resolved by the test, plus
//! polling helpers for waiting on background settlement.

use async_trait::async_trait;
use resource_loader::{FetchError, FetchResult, ResourceFetcher, ResourceKey};
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// One recorded invocation of the fetcher.
struct Call<T> {
    key: ResourceKey,
    cancel: CancellationToken,
    responder: Option<oneshot::Sender<FetchResult<T>>>,
}

/// Fetcher that parks every call until the test answers it.
///
/// Calls are numbered in the order they reach the fetcher.
pub struct ScriptedFetcher<T = String> {
    calls: StdMutex<Vec<Call<T>>>,
}

impl<T> Default for ScriptedFetcher<T> {
    fn default() -> Self {
        Self {
            calls: StdMutex::new(Vec::new()),
        }
    }
}

#[allow(dead_code)]
impl<T> ScriptedFetcher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of fetches started.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of fetches started for `key`.
    pub fn calls_for(&self, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.key.as_str() == key)
            .count()
    }

    /// Key requested by call `index`.
    pub fn key_of(&self, index: usize) -> ResourceKey {
        self.calls.lock().unwrap()[index].key.clone()
    }

    /// Whether call `index` has been told to abort.
    pub fn is_cancelled(&self, index: usize) -> bool {
        self.calls.lock().unwrap()[index].cancel.is_cancelled()
    }

    /// Answer call `index`. Returns false if the call was already answered
    /// or its future has been dropped.
    pub fn respond(&self, index: usize, result: FetchResult<T>) -> bool {
        let responder = self.calls.lock().unwrap()[index].responder.take();
        responder.is_some_and(|tx| tx.send(result).is_ok())
    }

    /// Wait until at least `n` fetches have started.
    pub async fn wait_for_calls(&self, n: usize) {
        let reached = wait_until(|| self.call_count() >= n).await;
        assert!(reached, "expected {n} fetch call(s), saw {}", self.call_count());
    }
}

#[async_trait]
impl<T> ResourceFetcher for ScriptedFetcher<T>
where
    T: Send + Sync + 'static,
{
    type Output = T;

    async fn fetch(&self, key: &ResourceKey, cancel: CancellationToken) -> FetchResult<T> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push(Call {
            key: key.clone(),
            cancel: cancel.clone(),
            responder: Some(tx),
        });

        tokio::select! {
            () = cancel.cancelled() => Err(FetchError::Aborted),
            result = rx => result.unwrap_or(Err(FetchError::Aborted)),
        }
    }
}

/// Poll `predicate`, yielding to other tasks between checks.
///
/// Returns false if the predicate is still false after five seconds.
#[allow(dead_code)]
pub async fn wait_until<F>(mut predicate: F) -> bool
where
    F: FnMut() -> bool,
{
    let polled = tokio::time::timeout(Duration::from_secs(5), async {
        while !predicate() {
            tokio::task::yield_now().await;
        }
    })
    .await;
    polled.is_ok()
}

/// Give spawned tasks a chance to run.
#[allow(dead_code)]
pub async fn run_pending_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
