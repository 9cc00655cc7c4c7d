//! HTTP transport for the resource loader.
//!
//! Treats each resource key as a URL, issues a GET with reqwest, and decodes
//! the JSON body into the fetcher's output type.

pub mod resource_fetcher;

pub use resource_fetcher::HttpResourceFetcher;
