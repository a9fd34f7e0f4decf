//! Configuration sections.

use serde::{Deserialize, Serialize};

/// Log levels accepted by [`LoggingConfig::level`].
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install a global subscriber at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,

    /// Service name attached to every log line.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
            service_name: default_service_name(),
        }
    }
}

/// Signature validation behaviour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Append the built-in decoders (path, UUID, date, datetime) after
    /// user-registered ones.
    #[serde(default = "default_true")]
    pub include_default_decoders: bool,

    /// Log rejected requests at debug level.
    #[serde(default = "default_true")]
    pub log_client_failures: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            include_default_decoders: true,
            log_client_failures: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "meridian".to_string()
}
