//! Error types for Meridian.
//!
//! This module provides the [`MeridianError`] type, the single error type that
//! leaves the request-validation boundary. It has three shapes:
//!
//! | Variant | When | HTTP status |
//! |---|---|---|
//! | `ImproperlyConfigured` | application startup (handler wiring is wrong) | 500 |
//! | `Validation` | the client sent values that fail type or constraint checks | 400 |
//! | `Internal` | a server-supplied value failed, or anything else unexpected | 500 |
//!
//! Only `Validation` carries client-visible detail. `Internal` keeps its
//! message and source for server-side logs and renders a generic envelope.

use crate::ErrorMessage;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`MeridianError`].
pub type MeridianResult<T> = Result<T, MeridianError>;

/// Message sent to clients in place of internal error detail.
const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (invalid client input).
    Validation,
    /// Internal server errors.
    Internal,
    /// Startup configuration errors.
    Configuration,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Internal | Self::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Meridian.
///
/// # Example
///
/// ```
/// use meridian_core::{ErrorMessage, MeridianError, ParamSource};
///
/// let error = MeridianError::validation(
///     "Validation failed for GET /users?id=abc",
///     vec![ErrorMessage::new("Expected `int`, got `str`")
///         .with_key("id")
///         .with_source(ParamSource::Query)],
/// );
///
/// assert_eq!(error.status_code(), http::StatusCode::BAD_REQUEST);
/// assert_eq!(error.messages().len(), 1);
/// ```
#[derive(Error, Debug)]
pub enum MeridianError {
    /// Handler wiring is invalid. Raised at startup and never retried.
    #[error("Improperly configured: {message}")]
    ImproperlyConfigured {
        /// Human-readable error message.
        message: String,
    },

    /// Client-supplied values failed validation.
    #[error("{detail}")]
    Validation {
        /// Summary naming the request method and URL.
        detail: String,
        /// Field-level messages.
        extra: Vec<ErrorMessage>,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message (not exposed to clients).
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl MeridianError {
    /// Creates a configuration error.
    #[must_use]
    pub fn improperly_configured(message: impl Into<String>) -> Self {
        Self::ImproperlyConfigured {
            message: message.into(),
        }
    }

    /// Creates a client validation error.
    #[must_use]
    pub fn validation(detail: impl Into<String>, extra: Vec<ErrorMessage>) -> Self {
        Self::Validation {
            detail: detail.into(),
            extra,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with the generic client-facing message.
    #[must_use]
    pub fn internal_server() -> Self {
        Self::internal(INTERNAL_SERVER_ERROR)
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ImproperlyConfigured { .. } => ErrorCategory::Configuration,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns the field-level messages of a validation error.
    ///
    /// Always empty for the other variants.
    #[must_use]
    pub fn messages(&self) -> &[ErrorMessage] {
        match self {
            Self::Validation { extra, .. } => extra,
            _ => &[],
        }
    }

    /// Returns `true` for errors caused by client input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// Internal and configuration errors render a generic message so that no
    /// server-side detail reaches the client.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let message = match self {
            Self::Validation { detail, .. } => detail.clone(),
            Self::Internal { .. } | Self::ImproperlyConfigured { .. } => {
                INTERNAL_SERVER_ERROR.to_string()
            }
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    fn error_code(&self) -> &'static str {
        match self {
            Self::ImproperlyConfigured { .. } | Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    #[must_use]
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation { extra, .. } if !extra.is_empty() => serde_json::to_value(extra).ok(),
            _ => None,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Field-level messages, present for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
