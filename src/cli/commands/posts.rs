//! `posts` command: the post list widget in the terminal.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::adapters::http::HttpResourceFetcher;
use crate::cli::output::progress::{create_spinner_with_message, hidden_spinner, ProgressBarExt};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, Post};
use crate::domain::ports::ResourceFetcher;
use crate::services::{PaginatedPosts, PaginatedPostsView, PostListView, ResourceLoader};

/// Arguments for `posts`.
#[derive(Args, Debug)]
pub struct PostsArgs {
    /// Posts endpoint (defaults to `posts.url` from configuration)
    #[arg(long)]
    pub url: Option<String>,

    /// Number of posts to show (defaults to `posts.display_limit`)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Retry once if the first load fails
    #[arg(long)]
    pub retry_on_error: bool,

    /// Load this many pages with "Load more" instead of one full list
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: Option<u32>,
}

/// Result of `posts` over the full collection.
#[derive(Debug, Serialize)]
pub struct PostsOutput {
    /// Endpoint the posts were loaded from
    pub url: String,
    /// Whether a failed load was retried
    pub retried: bool,
    /// Rendered list state
    #[serde(flatten)]
    pub view: PostListView,
}

/// Result of `posts --pages N`.
#[derive(Debug, Serialize)]
pub struct PagedPostsOutput {
    /// Endpoint the pages were loaded from
    pub url: String,
    /// Pages asked for on the command line
    pub requested_pages: u32,
    /// Whether a failed page was retried
    pub retried: bool,
    /// Rendered list state
    #[serde(flatten)]
    pub view: PaginatedPostsView,
}

impl CommandOutput for PagedPostsOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.view.headline()];
        if !self.view.posts.is_empty() {
            lines.push(TableFormatter::new().format_posts(&self.view.posts));
        }
        if let Some(ref error) = self.view.error {
            lines.push(format!("Failed to load: {error}"));
            if !self.retried {
                lines.push("Run again with --retry-on-error to retry.".to_string());
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl CommandOutput for PostsOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(headline) = self.view.headline() {
            lines.push(headline);
        }

        match &self.view {
            PostListView::Loaded { posts, .. } => {
                lines.push(TableFormatter::new().format_posts(posts));
            }
            PostListView::Failed { .. } if !self.retried => {
                lines.push("Run again with --retry-on-error to retry.".to_string());
            }
            _ => {}
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run `posts`.
pub async fn execute(args: PostsArgs, config: &Config, json: bool) -> Result<()> {
    let url = args.url.unwrap_or_else(|| config.posts.url.clone());
    let limit = args.limit.unwrap_or(config.posts.display_limit);

    let fetcher = HttpResourceFetcher::<Vec<Post>>::with_config(&config.http)?;
    let loader = ResourceLoader::new(fetcher);

    if let Some(pages) = args.pages {
        let page_size = args.limit.unwrap_or(config.posts.page_size);
        let list = PaginatedPosts::new(loader, url.clone(), page_size);
        let paged = load_pages(list, url, pages, args.retry_on_error, json).await;
        output(&paged, json);
        return Ok(());
    }

    let spinner = if json {
        hidden_spinner()
    } else {
        create_spinner_with_message("Loading posts…")
    };

    let mut subscription = loader.subscribe(url.as_str());
    let mut state = subscription.settled().await;
    let mut retried = false;

    if args.retry_on_error && state.error().is_some() {
        spinner.set_message("Retrying…");
        subscription.retry();
        state = subscription.settled().await;
        retried = true;
    }

    let view = PostListView::from_state(&state, limit);
    if view.can_retry() {
        spinner.finish_error("posts unavailable");
    } else {
        spinner.finish_success("posts loaded");
    }

    output(&PostsOutput { url, retried, view }, json);
    Ok(())
}

/// Press "Load more" until `pages` pages are in, stopping at the first
/// page that still fails after the optional retry.
async fn load_pages<F>(
    mut list: PaginatedPosts<F>,
    url: String,
    pages: u32,
    retry_on_error: bool,
    json: bool,
) -> PagedPostsOutput
where
    F: ResourceFetcher<Output = Vec<Post>> + 'static,
{
    let spinner = if json {
        hidden_spinner()
    } else {
        create_spinner_with_message("Loading page 1…")
    };

    let mut retried = false;
    let mut view = list.view();
    while view.page < pages {
        spinner.set_message(format!("Loading page {}…", view.page + 1));
        list.load_more();
        view = list.settled().await;

        if view.error.is_some() && retry_on_error && !retried {
            spinner.set_message(format!("Retrying page {}…", view.page + 1));
            list.retry();
            view = list.settled().await;
            retried = true;
        }
        if view.error.is_some() {
            break;
        }
    }

    match view.error {
        Some(ref error) => spinner.finish_error(error.clone()),
        None => spinner.finish_success(format!("{} pages loaded", view.page)),
    }

    PagedPostsOutput {
        url,
        requested_pages: pages,
        retried,
        view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{FetchError, FetchResult};
    use crate::domain::models::ResourceKey;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    const BASE: &str = "http://localhost/posts";

    /// Serves queued responses per page key; unknown keys get a 404.
    #[derive(Default)]
    struct PageFetcher {
        responses: Mutex<HashMap<String, VecDeque<FetchResult<Vec<Post>>>>>,
    }

    impl PageFetcher {
        fn with(self, page: u32, result: FetchResult<Vec<Post>>) -> Self {
            let key = crate::services::paginated_posts::page_key(BASE, page, 2);
            self.responses
                .lock()
                .unwrap()
                .entry(key.to_string())
                .or_default()
                .push_back(result);
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for PageFetcher {
        type Output = Vec<Post>;

        async fn fetch(&self, key: &ResourceKey, _cancel: CancellationToken) -> FetchResult<Vec<Post>> {
            tokio::task::yield_now().await;
            self.responses
                .lock()
                .unwrap()
                .get_mut(key.as_str())
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err(FetchError::status(404)))
        }
    }

    fn page(ids: &[u64]) -> Vec<Post> {
        ids.iter()
            .map(|&id| Post {
                id,
                user_id: Some(1),
                title: format!("title {id}"),
                body: format!("body {id}"),
            })
            .collect()
    }

    fn list(fetcher: PageFetcher) -> PaginatedPosts<PageFetcher> {
        PaginatedPosts::new(ResourceLoader::new(fetcher), BASE, 2)
    }

    #[tokio::test]
    async fn test_load_pages_appends_each_page() {
        let fetcher = PageFetcher::default()
            .with(1, Ok(page(&[1, 2])))
            .with(2, Ok(page(&[3, 4])));

        let out = load_pages(list(fetcher), BASE.to_string(), 2, false, true).await;

        assert_eq!(out.view.page, 2);
        let ids: Vec<u64> = out.view.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(out.view.error.is_none());
        assert!(!out.retried);
    }

    #[tokio::test]
    async fn test_load_pages_stops_at_failed_page() {
        let fetcher = PageFetcher::default().with(1, Ok(page(&[1, 2])));

        let out = load_pages(list(fetcher), BASE.to_string(), 3, false, true).await;

        assert_eq!(out.view.page, 1);
        assert_eq!(out.view.posts.len(), 2);
        assert_eq!(out.view.error.as_deref(), Some("Network response was not ok: 404"));
        assert!(out.view.can_load_more);
        assert!(out.to_human().contains("--retry-on-error"));
    }

    #[tokio::test]
    async fn test_load_pages_retries_failed_page_once() {
        let fetcher = PageFetcher::default()
            .with(1, Ok(page(&[1, 2])))
            .with(2, Err(FetchError::status(500)))
            .with(2, Ok(page(&[3])));

        let out = load_pages(list(fetcher), BASE.to_string(), 2, true, true).await;

        assert!(out.retried);
        assert_eq!(out.view.page, 2);
        assert_eq!(out.view.posts.len(), 3);
        assert!(out.view.error.is_none());
        assert_eq!(out.to_json()["requested_pages"], 2);
    }

    #[test]
    fn test_failed_output_suggests_retry() {
        let out = PostsOutput {
            url: "http://localhost/posts".to_string(),
            retried: false,
            view: PostListView::Failed {
                message: "Network response was not ok: 500".to_string(),
            },
        };

        let human = out.to_human();
        assert!(human.starts_with("Failed to load posts: Network response was not ok: 500"));
        assert!(human.contains("--retry-on-error"));
    }

    #[test]
    fn test_json_output_is_flattened() {
        let out = PostsOutput {
            url: "http://localhost/posts".to_string(),
            retried: true,
            view: PostListView::Loaded {
                total: 1,
                posts: vec![Post {
                    id: 1,
                    user_id: None,
                    title: "t".to_string(),
                    body: "b".to_string(),
                }],
            },
        };

        let json = out.to_json();
        assert_eq!(json["status"], "loaded");
        assert_eq!(json["total"], 1);
        assert_eq!(json["retried"], true);
        assert_eq!(json["posts"][0]["title"], "t");
    }
}
