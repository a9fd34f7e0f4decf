//! Request cookies.

use crate::ExtractionError;
use http::{header, HeaderMap};
use meridian_core::ParamSource;
use std::collections::HashMap;

/// Cookies parsed from the `Cookie` header.
///
/// # Example
///
/// ```rust
/// use http::{HeaderMap, HeaderValue};
/// use meridian_extract::Cookies;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     http::header::COOKIE,
///     HeaderValue::from_static("session=abc123; theme=\"dark\""),
/// );
///
/// let cookies = Cookies::from_headers(&headers).unwrap();
/// assert_eq!(cookies.get("session"), Some("abc123"));
/// assert_eq!(cookies.get("theme"), Some("dark"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookies {
    cookies: HashMap<String, String>,
}

impl Cookies {
    /// Creates an empty cookie jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Cookie` header value. Pairs without `=` are skipped.
    #[must_use]
    pub fn parse(header_value: &str) -> Self {
        let cookies = header_value
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| {
                (
                    name.trim().to_string(),
                    value.trim().trim_matches('"').to_string(),
                )
            })
            .collect();
        Self { cookies }
    }

    /// Parses every `Cookie` header of a request.
    ///
    /// # Errors
    ///
    /// Fails if a `Cookie` header is not valid UTF-8.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ExtractionError> {
        let mut jar = Self::new();
        for value in headers.get_all(header::COOKIE) {
            let value = value
                .to_str()
                .map_err(|_| ExtractionError::invalid_encoding(ParamSource::Header, "cookie"))?;
            jar.cookies.extend(Self::parse(value).cookies);
        }
        Ok(jar)
    }

    /// Returns a cookie value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns `true` if the cookie is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Iterates over all cookies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns `true` if there are no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_skips_malformed_pairs() {
        let cookies = Cookies::parse("a=1; broken; b = 2 ;c=");
        assert_eq!(cookies.get("a"), Some("1"));
        assert_eq!(cookies.get("b"), Some("2"));
        assert_eq!(cookies.get("c"), Some(""));
        assert!(!cookies.contains("broken"));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));
        let cookies = Cookies::from_headers(&headers).unwrap();
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn test_no_cookie_header() {
        let cookies = Cookies::from_headers(&HeaderMap::new()).unwrap();
        assert!(cookies.is_empty());
    }

    #[test]
    fn test_invalid_utf8_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_bytes(b"a=\xff").unwrap());
        let err = Cookies::from_headers(&headers).unwrap_err();
        assert_eq!(err.source(), ParamSource::Header);
    }
}
