//! Client-facing validation messages.
//!
//! An [`ErrorMessage`] describes one failed field of one request. The key and
//! source are optional: some failures cannot be pinned to a field, and in that
//! case neither is serialized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of an HTTP request a value was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamSource {
    /// The request body.
    Body,
    /// The query string.
    Query,
    /// A request header.
    Header,
    /// A request cookie.
    Cookie,
    /// A path parameter.
    Path,
}

impl ParamSource {
    /// Returns the lowercase name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level validation message.
///
/// # Example
///
/// ```
/// use meridian_core::{ErrorMessage, ParamSource};
///
/// let message = ErrorMessage::new("Expected `int`, got `str`")
///     .with_key("id")
///     .with_source(ParamSource::Query);
///
/// let json = serde_json::to_value(&message).unwrap();
/// assert_eq!(json["key"], "id");
/// assert_eq!(json["source"], "query");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Dotted field path, absent when the failure is not tied to a field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Where the offending value came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ParamSource>,
}

impl ErrorMessage {
    /// Creates a message without key or source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            key: None,
            message: message.into(),
            source: None,
        }
    }

    /// Sets the field key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the parameter source.
    #[must_use]
    pub fn with_source(mut self, source: ParamSource) -> Self {
        self.source = Some(source);
        self
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.key, self.source) {
            (Some(key), Some(source)) => write!(f, "{source} '{key}': {}", self.message),
            (Some(key), None) => write!(f, "'{key}': {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}
