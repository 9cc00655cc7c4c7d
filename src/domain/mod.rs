//! Domain layer for the resource loader
//!
//! This module contains the core types shared by the loader engine, its
//! fetcher port, and the adapters that implement it.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{FetchError, FetchResult};
