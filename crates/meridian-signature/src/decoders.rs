//! Type decoders for nominal types.
//!
//! A [`TypeDecoders`] registry is an ordered list of `(predicate, decoder)`
//! pairs. When a signature model is built, every nominal type found in a
//! parameter annotation is matched against the registry and the first
//! matching decoder is recorded in the model's own side table. Values of
//! types without a decoder fall through to the connection's
//! [`DefaultDeserializer`].

use crate::annotation::{names, TypeName};
use crate::value::Value;
use chrono::{DateTime, NaiveDate};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Decides whether a decoder applies to a nominal type.
pub type TypePredicate = Arc<dyn Fn(&TypeName) -> bool + Send + Sync>;

/// Converts a raw value into a value of the target nominal type.
pub type TypeDecoderFn = Arc<dyn Fn(&TypeName, Value) -> Result<Value, DecodeError> + Send + Sync>;

/// A value could not be decoded into its target type.
///
/// Decoders may end the message with `` `$.<path>` `` to point at a nested
/// location inside the value, as in ``Expected `int` - at `$.items[0]` ``.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    /// Creates a decode error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Reports that `value` is not of the `expected` kind.
    #[must_use]
    pub fn unexpected(expected: &str, value: &Value) -> Self {
        Self::new(format!("Expected `{expected}`, got `{}`", value.kind()))
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Fallback conversion for nominal types without a registered decoder.
///
/// Connections supply one so that, for example, websocket and HTTP handlers
/// can decode application types differently.
pub trait DefaultDeserializer: Send + Sync {
    /// Converts `value` into an instance of `target`.
    fn deserialize(&self, target: &TypeName, value: Value) -> Result<Value, DecodeError>;
}

/// Default deserializer that knows no nominal types.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectUnknownTypes;

impl DefaultDeserializer for RejectUnknownTypes {
    fn deserialize(&self, target: &TypeName, _value: Value) -> Result<Value, DecodeError> {
        Err(DecodeError::new(format!("Unsupported type: `{target}`")))
    }
}

#[derive(Clone)]
struct Entry {
    predicate: TypePredicate,
    decoder: TypeDecoderFn,
}

/// Ordered registry of type decoders. The first matching predicate wins.
///
/// # Example
///
/// ```
/// use meridian_signature::{CustomValue, DecodeError, TypeDecoders, TypeName, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct UserId(u64);
///
/// let decoders = TypeDecoders::new().for_type("UserId", |name, value| match value {
///     Value::Int(id) if id > 0 => Ok(Value::Custom(CustomValue::new(name.clone(), UserId(id as u64)))),
///     other => Err(DecodeError::unexpected("positive int", &other)),
/// });
///
/// assert!(decoders.find(&TypeName::new("UserId")).is_some());
/// assert!(decoders.find(&TypeName::new("OrderId")).is_none());
/// ```
#[derive(Clone, Default)]
pub struct TypeDecoders {
    entries: Vec<Entry>,
}

impl TypeDecoders {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a decoder selected by an arbitrary predicate.
    #[must_use]
    pub fn register<P, D>(mut self, predicate: P, decoder: D) -> Self
    where
        P: Fn(&TypeName) -> bool + Send + Sync + 'static,
        D: Fn(&TypeName, Value) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.entries.push(Entry {
            predicate: Arc::new(predicate),
            decoder: Arc::new(decoder),
        });
        self
    }

    /// Appends a decoder for exactly one nominal type.
    #[must_use]
    pub fn for_type<D>(self, name: impl AsRef<str>, decoder: D) -> Self
    where
        D: Fn(&TypeName, Value) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        let target = TypeName::new(name);
        self.register(move |candidate| *candidate == target, decoder)
    }

    /// Decoders for the built-in nominal types: `path`, `uuid`, `date` and
    /// `datetime`.
    #[must_use]
    pub fn defaults() -> Self {
        Self::new()
            .for_type(names::PATH, |_, value| match value {
                Value::Str(s) => Ok(Value::Path(PathBuf::from(s))),
                other => Err(DecodeError::unexpected("str", &other)),
            })
            .for_type(names::UUID, |_, value| match value {
                Value::Str(s) => Uuid::parse_str(&s)
                    .map(Value::Uuid)
                    .map_err(|_| DecodeError::new("Invalid UUID")),
                Value::Bytes(b) => Uuid::from_slice(&b)
                    .map(Value::Uuid)
                    .map_err(|_| DecodeError::new("Invalid UUID bytes")),
                other => Err(DecodeError::unexpected("uuid", &other)),
            })
            .for_type(names::DATE, |_, value| match value {
                Value::Str(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map(Value::Date)
                    .map_err(|_| DecodeError::new("Invalid ISO8601 date")),
                other => Err(DecodeError::unexpected("date", &other)),
            })
            .for_type(names::DATETIME, |_, value| match value {
                Value::Str(s) => DateTime::parse_from_rfc3339(&s)
                    .map(Value::DateTime)
                    .map_err(|_| DecodeError::new("Invalid RFC3339 encoded datetime")),
                other => Err(DecodeError::unexpected("datetime", &other)),
            })
    }

    /// Returns a registry consulting `self` first, then `fallback`.
    #[must_use]
    pub fn chain(&self, fallback: &Self) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(fallback.entries.iter().cloned());
        Self { entries }
    }

    /// Returns the first decoder whose predicate accepts `name`.
    #[must_use]
    pub fn find(&self, name: &TypeName) -> Option<TypeDecoderFn> {
        self.entries
            .iter()
            .find(|entry| (entry.predicate)(name))
            .map(|entry| Arc::clone(&entry.decoder))
    }

    /// Number of registered decoders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no decoder is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TypeDecoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDecoders")
            .field("len", &self.entries.len())
            .finish()
    }
}
