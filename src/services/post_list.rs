//! Post list view model.
//!
//! Maps the request state of a post collection onto what the list widget
//! shows: a loading notice, an error with a retry affordance, or the post
//! count followed by the first few posts.

use serde::Serialize;

use crate::domain::models::{Post, RequestState};

/// What the post list renders for a given request state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PostListView {
    /// Nothing requested, or the request was aborted. Renders nothing.
    Empty,
    /// A fetch is pending.
    Loading,
    /// The fetch failed; offers a retry.
    Failed {
        /// Error text shown to the user.
        message: String,
    },
    /// The collection arrived.
    Loaded {
        /// Size of the full collection.
        total: usize,
        /// Leading slice shown to the user.
        posts: Vec<Post>,
    },
}

impl PostListView {
    /// Build the view for `state`, showing at most `limit` posts.
    pub fn from_state(state: &RequestState<Vec<Post>>, limit: usize) -> Self {
        match state {
            RequestState::Idle => Self::Empty,
            RequestState::Loading => Self::Loading,
            RequestState::Failed(err) => Self::Failed {
                message: err.to_string(),
            },
            RequestState::Ready(posts) => Self::Loaded {
                total: posts.len(),
                posts: posts.iter().take(limit).cloned().collect(),
            },
        }
    }

    /// Only a failed load offers a retry.
    pub const fn can_retry(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// One-line summary shown above the list.
    pub fn headline(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Loading => Some("Loading posts…".to_string()),
            Self::Failed { message } => Some(format!("Failed to load posts: {message}")),
            Self::Loaded { total, .. } => {
                Some(format!("Showing {total} posts (fetched with the resource loader & cached)"))
            }
        }
    }
}
