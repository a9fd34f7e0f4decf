//! Request identifiers.
//!
//! Every validation failure is logged with the [`RequestId`] of the request
//! that caused it, so client reports can be matched to server logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request close
/// together when sorted by id.
///
/// # Example
///
/// ```
/// use meridian_core::RequestId;
///
/// let id = RequestId::new();
/// let parsed: RequestId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Reuses an incoming request id header when it holds a valid UUID,
    /// otherwise generates a fresh one.
    #[must_use]
    pub fn from_header_or_new(header: Option<&str>) -> Self {
        header
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_request_id_reuses_valid_header() {
        let uuid = Uuid::now_v7();
        let header = uuid.to_string();
        let id = RequestId::from_header_or_new(Some(&header));
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_request_id_ignores_garbage_header() {
        let id = RequestId::from_header_or_new(Some("not-a-uuid"));
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        let parsed: RequestId = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(id, parsed);
    }
}
