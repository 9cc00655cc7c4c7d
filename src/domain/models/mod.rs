//! Domain models

pub mod config;
pub mod post;
pub mod request_state;
pub mod resource_key;

pub use config::{Config, HttpConfig, LoggingConfig, PostsConfig};
pub use post::Post;
pub use request_state::RequestState;
pub use resource_key::ResourceKey;
