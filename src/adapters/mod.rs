//! Adapters implementing domain ports.
//!
//! - `http`: reqwest-backed `ResourceFetcher` that GETs keys as URLs

pub mod http;

pub use http::HttpResourceFetcher;
