//! Layered configuration loading.
//!
//! Later layers override earlier ones: built-in defaults or a preset, then a
//! TOML or JSON file (or string), then `PREFIX__SECTION__KEY` environment
//! variables, optionally seeded from a `.env` file.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, MeridianConfig};

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use meridian_config::ConfigLoader;
///
/// # fn main() -> Result<(), meridian_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("meridian.toml")?
///     .with_dotenv()?
///     .with_env_prefix("MERIDIAN")
///     .load()?;
///
/// println!("log level: {}", config.logging.level);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: MeridianConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MeridianConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = MeridianConfig::default();
        self
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use meridian_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = MeridianConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = MeridianConfig::production();
        self
    }

    /// Load a `.toml` or `.json` file, chosen by extension.
    ///
    /// The file replaces the current configuration; sections it omits take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, has an unknown extension,
    /// does not parse, or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        self.config = match extension.as_deref() {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `format` (`"toml"` or `"json"`).
    ///
    /// ```
    /// use meridian_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [validation]
    ///     include_default_decoders = false
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!config.validation.include_default_decoders);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on an unknown format or a parse error.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::UnsupportedFormat(format.to_string())),
        };
        Ok(self)
    }

    /// Set the prefix for environment overrides.
    ///
    /// Variables use the form `PREFIX__SECTION__KEY`, for example
    /// `MERIDIAN__LOGGING__LEVEL=debug` or
    /// `MERIDIAN__VALIDATION__LOG_CLIENT_FAILURES=false`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load `.env` from the current directory or its parents, if present.
    ///
    /// # Errors
    ///
    /// Fails if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a specific `.env` file. Variables already set are kept.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or cannot be parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Fails if an override does not parse or validation fails.
    pub fn load(mut self) -> Result<MeridianConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Return the configuration as loaded so far, without environment
    /// overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> MeridianConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let logging = &mut self.config.logging;
        let validation = &mut self.config.validation;

        match parts.as_slice() {
            ["LOGGING", "ENABLED"] => logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => logging.level = value.to_lowercase(),
            ["LOGGING", "FORMAT"] => {
                logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => logging.ansi_enabled = bool_var(key, value)?,
            ["LOGGING", "INCLUDE_LOCATION"] => logging.include_location = bool_var(key, value)?,
            ["LOGGING", "SERVICE_NAME"] => logging.service_name = value.to_string(),

            ["VALIDATION", "INCLUDE_DEFAULT_DECODERS"] => {
                validation.include_default_decoders = bool_var(key, value)?;
            }
            ["VALIDATION", "LOG_CLIENT_FAILURES"] => {
                validation.log_client_failures = bool_var(key, value)?;
            }

            _ => {
                return Err(ConfigError::env_parse_error(
                    key,
                    "unknown configuration key",
                ))
            }
        }

        Ok(())
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
