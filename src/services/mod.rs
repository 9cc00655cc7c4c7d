//! Service layer
//!
//! - `resource_loader`: the fetch/cache/dedup/cancel engine
//! - `post_list`: view model for the post list widget built on the loader
//! - `paginated_posts`: "Load more" list fetching one page key at a time

pub mod paginated_posts;
pub mod post_list;
pub mod resource_loader;

pub use paginated_posts::{PaginatedPosts, PaginatedPostsView};
pub use post_list::PostListView;
pub use resource_loader::{
    OperationId, ResourceLoader, ResourceStore, Subscription, SubscriptionId,
};
