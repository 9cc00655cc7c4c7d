//! Layered configuration loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::infrastructure::logging::RotationPolicy;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown `logging.level`
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown `logging.format`
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown `logging.rotation`
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    /// `http.timeout_secs` is zero
    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    /// `http.user_agent` is empty
    #[error("HTTP user agent cannot be empty")]
    EmptyUserAgent,

    /// `posts.url` is empty
    #[error("Posts URL cannot be empty")]
    EmptyPostsUrl,

    /// `posts.display_limit` is zero
    #[error("Invalid display_limit: {0}. Must be at least 1")]
    InvalidDisplayLimit(usize),

    /// `posts.page_size` is zero
    #[error("Invalid page_size: {0}. Must be at least 1")]
    InvalidPageSize(usize),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .resource-loader/config.yaml (project config)
    /// 3. .resource-loader/local.yaml (project local overrides, optional)
    /// 4. Environment variables (`RESOURCE_LOADER_*` prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Self::base()
            .merge(Yaml::file(".resource-loader/config.yaml"))
            .merge(Yaml::file(".resource-loader/local.yaml"))
            .merge(Env::prefixed("RESOURCE_LOADER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override values from the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Self::base()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("RESOURCE_LOADER_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if RotationPolicy::parse(&config.logging.rotation).is_none() {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        if config.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.http.timeout_secs));
        }

        if config.http.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }

        if config.posts.url.trim().is_empty() {
            return Err(ConfigError::EmptyPostsUrl);
        }

        if config.posts.display_limit == 0 {
            return Err(ConfigError::InvalidDisplayLimit(config.posts.display_limit));
        }

        if config.posts.page_size == 0 {
            return Err(ConfigError::InvalidPageSize(config.posts.page_size));
        }

        Ok(())
    }
}
