//! The view of a request needed to coerce values and attribute errors.

use crate::decoders::{DefaultDeserializer, RejectUnknownTypes};
use std::collections::BTreeSet;

/// Request-side collaborator of a signature model.
///
/// Implemented by HTTP and websocket connections. Websocket connections have
/// no method.
pub trait Connection {
    /// HTTP method, `None` for websockets.
    fn method(&self) -> Option<&str>;

    /// Full request URL.
    fn url(&self) -> &str;

    /// Returns `true` if the query string carries `name`.
    fn has_query_param(&self, name: &str) -> bool;

    /// Deserializer for nominal types without a registered decoder.
    fn default_deserializer(&self) -> &dyn DefaultDeserializer;
}

/// An in-memory connection for tests and tools.
///
/// # Example
///
/// ```
/// use meridian_signature::{Connection, MockConnection};
///
/// let conn = MockConnection::get("/users?id=1").with_query_param("id");
/// assert_eq!(conn.method(), Some("GET"));
/// assert!(conn.has_query_param("id"));
/// ```
#[derive(Debug, Clone)]
pub struct MockConnection {
    method: Option<String>,
    url: String,
    query_params: BTreeSet<String>,
    deserializer: RejectUnknownTypes,
}

impl MockConnection {
    /// A connection with the given method and URL.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            url: url.into(),
            query_params: BTreeSet::new(),
            deserializer: RejectUnknownTypes,
        }
    }

    /// A `GET` connection.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// A websocket connection, which has no method.
    #[must_use]
    pub fn websocket(url: impl Into<String>) -> Self {
        Self {
            method: None,
            ..Self::new("", url)
        }
    }

    /// Marks `name` as present in the query string.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.query_params.insert(name.into());
        self
    }
}

impl Connection for MockConnection {
    fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains(name)
    }

    fn default_deserializer(&self) -> &dyn DefaultDeserializer {
        &self.deserializer
    }
}
