//! Application configuration model.

use serde::{Deserialize, Serialize};

/// Main configuration structure for the resource loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP fetcher configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Post list view configuration
    #[serde(default)]
    pub posts: PostsConfig,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Idle connections kept per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("resource-loader/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_pool_max_idle_per_host() -> usize {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Log file rotation: daily, hourly, never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_log_rotation(),
        }
    }
}

/// Post list view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PostsConfig {
    /// Endpoint serving the post collection
    #[serde(default = "default_posts_url")]
    pub url: String,

    /// Number of posts rendered by the list view
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,

    /// Posts requested per page by the paginated list
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_posts_url() -> String {
    "https://jsonplaceholder.typicode.com/posts".to_string()
}

const fn default_display_limit() -> usize {
    10
}

const fn default_page_size() -> usize {
    10
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            url: default_posts_url(),
            display_limit: default_display_limit(),
            page_size: default_page_size(),
        }
    }
}
