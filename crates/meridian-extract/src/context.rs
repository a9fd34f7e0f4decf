//! A request connection backed by `http` request parts.
//!
//! [`RequestConnection`] is the [`Connection`] handed to signature models in
//! production. It owns the decoded query string, cookies, path parameters
//! and the already-read body, so kwargs can be collected without touching
//! the transport again.

use crate::{Cookies, ExtractionError, QueryParams};
use bytes::Bytes;
use http::{request::Parts, HeaderMap, Method, Uri};
use indexmap::IndexMap;
use meridian_core::RequestId;
use meridian_signature::{Connection, DefaultDeserializer, RejectUnknownTypes};
use std::fmt;
use std::sync::Arc;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// All parts of one request needed to validate a handler's parameters.
///
/// # Example
///
/// ```rust
/// use meridian_extract::RequestConnection;
/// use meridian_signature::Connection;
/// use http::{Method, Uri};
///
/// let conn = RequestConnection::builder()
///     .method(Method::GET)
///     .uri(Uri::from_static("/users/42?active=true"))
///     .header("cookie", "sid=abc")
///     .path_param("user_id", "42")
///     .build()
///     .unwrap();
///
/// assert_eq!(conn.method(), Some("GET"));
/// assert_eq!(conn.url(), "/users/42?active=true");
/// assert!(conn.has_query_param("active"));
/// assert_eq!(conn.cookies().get("sid"), Some("abc"));
/// assert_eq!(conn.path_param("user_id"), Some("42"));
/// ```
#[derive(Clone)]
pub struct RequestConnection {
    method: Option<Method>,
    uri: Uri,
    url: String,
    headers: HeaderMap,
    cookies: Cookies,
    query: QueryParams,
    path_params: IndexMap<String, String>,
    body: Bytes,
    request_id: RequestId,
    deserializer: Arc<dyn DefaultDeserializer>,
}

impl RequestConnection {
    /// Starts building a connection.
    #[must_use]
    pub fn builder() -> RequestConnectionBuilder {
        RequestConnectionBuilder::new()
    }

    /// Builds a connection from request parts and the fully read body.
    ///
    /// # Errors
    ///
    /// Fails if the query string or a cookie header cannot be decoded.
    pub fn from_parts(parts: Parts, body: Bytes) -> Result<Self, ExtractionError> {
        RequestConnectionBuilder::new()
            .method(parts.method)
            .uri(parts.uri)
            .headers(parts.headers)
            .body(body)
            .build()
    }

    /// HTTP method, `None` for websockets.
    #[must_use]
    pub fn http_method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as a string, `None` if absent.
    ///
    /// # Errors
    ///
    /// Fails if the value is not valid UTF-8.
    pub fn header(&self, name: &str) -> Result<Option<&str>, ExtractionError> {
        self.headers
            .get(name)
            .map(|value| {
                value.to_str().map_err(|_| {
                    ExtractionError::invalid_encoding(meridian_core::ParamSource::Header, name)
                })
            })
            .transpose()
    }

    /// Parsed cookies.
    #[must_use]
    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    /// Parsed query string.
    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// A path parameter captured by the router.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The `Content-Type` header, if readable.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Request id, taken from `x-request-id` when it holds a UUID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }
}

impl Connection for RequestConnection {
    fn method(&self) -> Option<&str> {
        self.method.as_ref().map(Method::as_str)
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn has_query_param(&self, name: &str) -> bool {
        self.query.contains(name)
    }

    fn default_deserializer(&self) -> &dyn DefaultDeserializer {
        self.deserializer.as_ref()
    }
}

impl fmt::Debug for RequestConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConnection")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("request_id", &self.request_id)
            .field("path_params", &self.path_params)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`RequestConnection`]. Defaults to `GET /`.
pub struct RequestConnectionBuilder {
    method: Option<Method>,
    uri: Uri,
    headers: HeaderMap,
    path_params: IndexMap<String, String>,
    body: Bytes,
    deserializer: Arc<dyn DefaultDeserializer>,
}

impl RequestConnectionBuilder {
    /// Creates a builder for `GET /`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Some(Method::GET),
            uri: Uri::default(),
            headers: HeaderMap::new(),
            path_params: IndexMap::new(),
            body: Bytes::new(),
            deserializer: Arc::new(RejectUnknownTypes),
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Marks the connection as a websocket, which has no method.
    #[must_use]
    pub fn websocket(mut self) -> Self {
        self.method = None;
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the deserializer for nominal types without a decoder.
    #[must_use]
    pub fn default_deserializer(mut self, deserializer: impl DefaultDeserializer + 'static) -> Self {
        self.deserializer = Arc::new(deserializer);
        self
    }

    /// Decodes the query string and cookies.
    ///
    /// # Errors
    ///
    /// Fails if the query string or a cookie header cannot be decoded.
    pub fn build(self) -> Result<RequestConnection, ExtractionError> {
        let query = QueryParams::parse(self.uri.query().unwrap_or(""))?;
        let cookies = Cookies::from_headers(&self.headers)?;
        let request_id = RequestId::from_header_or_new(
            self.headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok()),
        );

        Ok(RequestConnection {
            method: self.method,
            url: self.uri.to_string(),
            uri: self.uri,
            headers: self.headers,
            cookies,
            query,
            path_params: self.path_params,
            body: self.body,
            request_id,
            deserializer: self.deserializer,
        })
    }
}

impl Default for RequestConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
