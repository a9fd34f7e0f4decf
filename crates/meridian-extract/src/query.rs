//! Query string parameters.
//!
//! Unlike a typed deserializer, [`QueryParams`] keeps every value of a
//! repeated key so list parameters such as `?tag=a&tag=b` reach coercion
//! intact.

use crate::ExtractionError;
use indexmap::IndexMap;
use meridian_core::ParamSource;

/// Decoded query string, keys in first-seen order.
///
/// # Example
///
/// ```rust
/// use meridian_extract::QueryParams;
///
/// let query = QueryParams::parse("q=rust+lang&tag=a&tag=b").unwrap();
/// assert_eq!(query.get("q"), Some("rust lang"));
/// assert_eq!(query.get_all("tag"), Some(&["a".to_string(), "b".to_string()][..]));
/// assert!(!query.contains("limit"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parses a raw query string (without the leading `?`).
    ///
    /// # Errors
    ///
    /// Fails if the query string is not valid `application/x-www-form-urlencoded`.
    pub fn parse(query: &str) -> Result<Self, ExtractionError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| ExtractionError::malformed(ParamSource::Query, e.to_string()))?;

        let mut params: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in pairs {
            params.entry(key).or_default().push(value);
        }
        Ok(Self { params })
    }

    /// First value of a key.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of a key.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Iterates over keys and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        assert!(QueryParams::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_url_encoded_values() {
        let query = QueryParams::parse("name=John%20Doe&email=john%40example.com").unwrap();
        assert_eq!(query.get("name"), Some("John Doe"));
        assert_eq!(query.get("email"), Some("john@example.com"));
    }

    #[test]
    fn test_repeated_keys_keep_order() {
        let query = QueryParams::parse("b=1&a=2&b=3").unwrap();
        let keys: Vec<_> = query.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(query.get("b"), Some("1"));
        assert_eq!(query.get_all("b").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_key_without_value() {
        let query = QueryParams::parse("flag&x=1").unwrap();
        assert_eq!(query.get("flag"), Some(""));
    }
}
