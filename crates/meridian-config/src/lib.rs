//! Typed configuration for Meridian.
//!
//! [`MeridianConfig`] has two sections:
//!
//! - [`LoggingConfig`] - log level, format and service name
//! - [`ValidationConfig`] - whether the built-in type decoders are appended
//!   and whether rejected requests are logged
//!
//! Unknown fields are rejected everywhere.
//!
//! # Example
//!
//! ```no_run
//! use meridian_config::ConfigLoader;
//!
//! # fn main() -> Result<(), meridian_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("meridian.toml")?
//!     .with_env_prefix("MERIDIAN")
//!     .load()?;
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! service_name = "orders"
//!
//! [validation]
//! include_default_decoders = true
//! log_client_failures = false
//! ```
//!
//! # Environment Variable Overrides
//!
//! Any value can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `MERIDIAN__LOGGING__LEVEL=debug`
//! - `MERIDIAN__LOGGING__FORMAT=pretty`
//! - `MERIDIAN__VALIDATION__INCLUDE_DEFAULT_DECODERS=false`

#![doc(html_root_url = "https://docs.rs/meridian-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{MeridianConfig, MeridianConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, ValidationConfig, LOG_LEVELS};
