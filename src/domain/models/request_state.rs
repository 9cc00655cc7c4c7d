//! Per-subscriber view of a resource request.

use std::fmt;
use std::sync::Arc;

use crate::domain::errors::FetchError;

/// Observable state of one subscription.
///
/// Exactly one of these holds at any moment:
///
/// | variant   | `is_loading()` | `data()` | `error()` |
/// |-----------|----------------|----------|-----------|
/// | `Idle`    | false          | None     | None      |
/// | `Loading` | true           | None     | None      |
/// | `Ready`   | false          | Some     | None      |
/// | `Failed`  | false          | None     | Some      |
pub enum RequestState<T> {
    /// No key, or the pending fetch was aborted.
    Idle,
    /// A fetch is pending.
    Loading,
    /// The most recent fetch succeeded.
    Ready(Arc<T>),
    /// The most recent fetch failed with a non-abort error.
    Failed(FetchError),
}

impl<T> RequestState<T> {
    /// The loaded value, if the request succeeded.
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if the request failed.
    pub const fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// True while a fetch is pending.
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// True once the state can no longer change without a new request.
    pub const fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    /// Lowercase state name used in output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

impl<T> Clone for RequestState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading => Self::Loading,
            Self::Ready(value) => Self::Ready(Arc::clone(value)),
            Self::Failed(err) => Self::Failed(err.clone()),
        }
    }
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T: PartialEq> PartialEq for RequestState<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Idle, Self::Idle) | (Self::Loading, Self::Loading) => true,
            (Self::Ready(a), Self::Ready(b)) => a == b,
            (Self::Failed(a), Self::Failed(b)) => a == b,
            _ => false,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RequestState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Loading => f.write_str("Loading"),
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}
