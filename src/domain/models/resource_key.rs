//! Resource key identifying a fetchable value.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque identifier (typically a URL) naming a fetchable resource.
///
/// Keys compare by value. An empty key means "no resource": subscribing to
/// it yields an idle state and never reaches the fetcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Create a key from anything string-like.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The empty key.
    pub const fn none() -> Self {
        Self(String::new())
    }

    /// The key as a URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the key names no resource.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ResourceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&String> for ResourceKey {
    fn from(key: &String) -> Self {
        Self(key.clone())
    }
}

impl<K: Into<Self>> From<Option<K>> for ResourceKey {
    fn from(key: Option<K>) -> Self {
        key.map_or_else(Self::none, Into::into)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
