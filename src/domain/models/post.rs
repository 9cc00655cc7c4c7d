//! Post model.

use serde::{Deserialize, Serialize};

/// A post as served by the JSONPlaceholder `/posts` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post identifier.
    pub id: u64,
    /// Author, when the server includes it.
    #[serde(default)]
    pub user_id: Option<u64>,
    /// Title line.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub body: String,
}
