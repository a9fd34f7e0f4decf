//! Logging setup for Meridian.
//!
//! Meridian crates emit `tracing` events: model construction at debug,
//! rejected requests at debug, failing injected dependencies at error and
//! configuration errors at warn. This crate installs a subscriber for them.
//!
//! ```rust,ignore
//! use meridian_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! ```

#![doc(html_root_url = "https://docs.rs/meridian-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
