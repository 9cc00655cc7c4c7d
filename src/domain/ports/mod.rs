//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interface that fetch adapters must implement:
//! - ResourceFetcher: load one resource by key, honouring a cancellation token
//!
//! The loader engine depends only on this trait, so tests and alternative
//! transports plug in without touching it.

pub mod resource_fetcher;

pub use resource_fetcher::ResourceFetcher;
