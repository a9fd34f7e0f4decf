//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, ValidationConfig, LOG_LEVELS};

/// Complete Meridian configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use meridian_config::MeridianConfig;
///
/// let config = MeridianConfig::default();
/// assert!(config.validation.include_default_decoders);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MeridianConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Signature validation configuration.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl MeridianConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> MeridianConfigBuilder {
        MeridianConfigBuilder::new()
    }

    /// Checks values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the log level is unknown or
    /// the service name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!(
                    "unknown level '{}', expected one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }

        if self.logging.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.service_name",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs with source locations.
    ///
    /// ```
    /// use meridian_config::{LogFormat, MeridianConfig};
    ///
    /// let config = MeridianConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON info logs, rejected requests not logged.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config.validation.log_client_failures = false;
        config
    }
}

/// Builder for [`MeridianConfig`].
#[derive(Debug, Default)]
pub struct MeridianConfigBuilder {
    logging: Option<LoggingConfig>,
    validation: Option<ValidationConfig>,
}

impl MeridianConfigBuilder {
    /// Create a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the validation section.
    #[must_use]
    pub fn validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> MeridianConfig {
        MeridianConfig {
            logging: self.logging.unwrap_or_default(),
            validation: self.validation.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<MeridianConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
