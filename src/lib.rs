//! Resource Loader - fetch-with-cache engine for list views
//!
//! The loader memoizes successful responses per resource key, deduplicates
//! concurrent requests for the same key, cancels requests nobody observes any
//! more, and offers an explicit retry that bypasses the cache.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): keys, request states, errors, and the fetcher port
//! - **Service Layer** (`services`): the loader engine and the post list view model
//! - **Adapters** (`adapters`): the reqwest-backed HTTP fetcher
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use resource_loader::{HttpResourceFetcher, ResourceLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let loader = ResourceLoader::new(HttpResourceFetcher::<serde_json::Value>::new()?);
//!     let mut posts = loader.subscribe("https://jsonplaceholder.typicode.com/posts");
//!     let state = posts.settled().await;
//!     println!("{}", state.as_str());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::HttpResourceFetcher;
pub use domain::models::{Config, Post, RequestState, ResourceKey};
pub use domain::ports::ResourceFetcher;
pub use domain::{FetchError, FetchResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    OperationId, PaginatedPosts, PaginatedPostsView, PostListView, ResourceLoader, ResourceStore,
    Subscription, SubscriptionId,
};
