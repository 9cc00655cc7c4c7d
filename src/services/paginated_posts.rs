//! "Load more" post list.
//!
//! Pages are requested from the server one at a time as
//! `<url>?_page=<n>&_limit=<size>`. Each page is its own resource key, so
//! pages already fetched come from the loader's cache, two lists over the
//! same loader share page fetches, and a failed page can be retried without
//! touching the pages before it.

use serde::Serialize;
use tracing::debug;

use crate::domain::errors::FetchError;
use crate::domain::models::{Post, RequestState, ResourceKey};
use crate::domain::ports::ResourceFetcher;
use crate::services::resource_loader::{ResourceLoader, Subscription};

/// Snapshot of a paginated list for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginatedPostsView {
    /// Last page appended to `posts`; 0 before the first page arrives.
    pub page: u32,
    /// Every post loaded so far, in page order.
    pub posts: Vec<Post>,
    /// A page request is pending.
    pub loading: bool,
    /// Failure of the most recent page request.
    pub error: Option<String>,
    /// "Load more" is enabled only while no page is pending.
    pub can_load_more: bool,
}

impl PaginatedPostsView {
    /// One-line summary shown above the list.
    pub fn headline(&self) -> String {
        format!("Paginated posts with \"Load more\". Page: {}", self.page)
    }
}

/// Resource key for one page of `base_url`.
pub fn page_key(base_url: &str, page: u32, page_size: usize) -> ResourceKey {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    ResourceKey::new(format!("{base_url}{separator}_page={page}&_limit={page_size}"))
}

/// Accumulating list of posts loaded page by page.
///
/// Successful pages are appended; a failed page leaves the loaded posts in
/// place and keeps its subscription so it can be retried.
pub struct PaginatedPosts<F>
where
    F: ResourceFetcher<Output = Vec<Post>> + 'static,
{
    loader: ResourceLoader<F>,
    base_url: String,
    page_size: usize,
    posts: Vec<Post>,
    page: u32,
    requested: u32,
    pending: Option<Subscription<F>>,
    error: Option<FetchError>,
}

impl<F> PaginatedPosts<F>
where
    F: ResourceFetcher<Output = Vec<Post>> + 'static,
{
    /// An empty list; call [`load_more`](Self::load_more) to request page 1.
    pub fn new(loader: ResourceLoader<F>, base_url: impl Into<String>, page_size: usize) -> Self {
        Self {
            loader,
            base_url: base_url.into(),
            page_size,
            posts: Vec::new(),
            page: 0,
            requested: 0,
            pending: None,
            error: None,
        }
    }

    /// Whether a page request is pending.
    pub fn is_loading(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|sub| sub.state().is_loading())
    }

    /// Request the page after the last one appended.
    ///
    /// Returns false without doing anything while a page is still loading.
    /// After a failure this requests the failed page again.
    pub fn load_more(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }

        self.requested = self.page + 1;
        self.error = None;
        let key = page_key(&self.base_url, self.requested, self.page_size);
        debug!(page = self.requested, key = %key, "requesting page");

        let subscription = self.loader.subscribe(key);
        let state = subscription.state();
        self.pending = Some(subscription);
        self.absorb(&state);
        true
    }

    /// Force a fresh fetch of the page that just failed.
    ///
    /// Returns false when there is no failed page.
    pub fn retry(&mut self) -> bool {
        let Some(subscription) = self.pending.as_mut() else {
            return false;
        };
        if subscription.state().error().is_none() {
            return false;
        }

        subscription.retry();
        self.error = None;
        let state = subscription.state();
        self.absorb(&state);
        true
    }

    /// Wait for the pending page, if any, and return the resulting view.
    pub async fn settled(&mut self) -> PaginatedPostsView {
        if let Some(subscription) = self.pending.as_mut() {
            let state = subscription.settled().await;
            self.absorb(&state);
        }
        self.view()
    }

    /// Current snapshot.
    pub fn view(&self) -> PaginatedPostsView {
        let loading = self.is_loading();
        PaginatedPostsView {
            page: self.page,
            posts: self.posts.clone(),
            loading,
            error: self.error.as_ref().map(ToString::to_string),
            can_load_more: !loading,
        }
    }

    fn absorb(&mut self, state: &RequestState<Vec<Post>>) {
        match state {
            RequestState::Loading => {}
            RequestState::Ready(posts) => {
                self.posts.extend(posts.iter().cloned());
                self.page = self.requested;
                self.error = None;
                self.pending = None;
                debug!(page = self.page, total = self.posts.len(), "page appended");
            }
            RequestState::Failed(err) => {
                self.error = Some(err.clone());
            }
            RequestState::Idle => {
                self.pending = None;
            }
        }
    }
}
