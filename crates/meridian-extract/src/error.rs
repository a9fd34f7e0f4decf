//! Extraction error types.
//!
//! Extraction fails before coercion when the raw request itself cannot be
//! read: a query string that does not decode, a non UTF-8 cookie header, or a
//! body that is not JSON. These are client errors and convert into
//! [`MeridianError::Validation`] with one source-tagged message.

use http::StatusCode;
use meridian_core::{ErrorMessage, MeridianError, ParamSource};
use std::fmt;

/// Error that occurs while reading raw values from a request.
///
/// # Example
///
/// ```rust
/// use meridian_core::ParamSource;
/// use meridian_extract::ExtractionError;
/// use http::StatusCode;
///
/// let err = ExtractionError::malformed(ParamSource::Body, "expected value at line 1 column 1");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.source(), ParamSource::Body);
/// assert!(err.to_string().contains("body"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    source: ParamSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Value could not be decoded
    Malformed,
    /// Header value is not visible ASCII / UTF-8
    InvalidEncoding,
    /// Content-Type is not JSON
    UnsupportedMediaType,
}

impl ExtractionError {
    /// The query string, cookie header or body could not be decoded.
    #[must_use]
    pub fn malformed(source: ParamSource, details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            source,
            kind: ExtractionErrorKind::Malformed,
            field: None,
            message: format!("failed to decode {source}: {details}"),
        }
    }

    /// A header or cookie value is not valid UTF-8.
    #[must_use]
    pub fn invalid_encoding(source: ParamSource, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            source,
            kind: ExtractionErrorKind::InvalidEncoding,
            message: format!("invalid UTF-8 in {source} '{field}'"),
            field: Some(field),
        }
    }

    /// The body has a content type other than JSON.
    #[must_use]
    pub fn unsupported_media_type(actual: Option<&str>) -> Self {
        let actual = actual.unwrap_or("none");
        Self {
            source: ParamSource::Body,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            field: None,
            message: format!("unsupported content type: expected 'application/json', got '{actual}'"),
        }
    }

    /// Part of the request the error came from.
    #[must_use]
    pub fn source(&self) -> ParamSource {
        self.source
    }

    /// Field name, when the error concerns one header or cookie.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Malformed | ExtractionErrorKind::InvalidEncoding => {
                StatusCode::BAD_REQUEST
            }
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Converts into the validation error surfaced for `method` and `url`.
    #[must_use]
    pub fn into_validation_error(self, method: &str, url: &str) -> MeridianError {
        let mut message = ErrorMessage::new(self.message).with_source(self.source);
        if let Some(field) = self.field {
            message = message.with_key(field);
        }
        MeridianError::validation(format!("Validation failed for {method} {url}"), vec![message])
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExtractionError {}
