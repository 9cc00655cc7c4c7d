//! Logger settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::models::LoggingConfig;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_format")]
    pub format: LogFormat,

    /// Directory for log files (optional, if None logs only to stderr)
    pub log_dir: Option<PathBuf>,

    /// Log rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

/// Line format for stderr output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable multi-line output
    Pretty,
}

/// How often the log file rolls over
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// New file every day
    #[default]
    Daily,
    /// New file every hour
    Hourly,
    /// Single file, never rotated
    Never,
}

impl RotationPolicy {
    /// Parse a configured policy name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "hourly" => Some(Self::Hourly),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(settings: &LoggingConfig) -> Self {
        let format = if settings.format.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        Self {
            level: settings.level.clone(),
            format,
            log_dir: settings.log_dir.as_ref().map(PathBuf::from),
            rotation: RotationPolicy::parse(&settings.rotation).unwrap_or_default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

const fn default_format() -> LogFormat {
    LogFormat::Pretty
}
