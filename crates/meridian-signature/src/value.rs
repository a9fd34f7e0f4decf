//! Dynamic values flowing into and out of a signature model.
//!
//! Raw kwargs (strings from the query string, JSON from the body, values
//! already produced by dependency providers) and coerced kwargs share the
//! same [`Value`] tree, so a value that is already of the right type can pass
//! through coercion untouched.

use crate::annotation::{names, TypeName};
use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Mapping from parameter name to value, in declaration order.
pub type Kwargs = IndexMap<String, Value>;

/// A dynamically typed value.
#[derive(Clone)]
pub enum Value {
    /// Absent value (`None`).
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// String-keyed mapping, insertion ordered.
    Map(IndexMap<String, Value>),
    /// UUID.
    Uuid(Uuid),
    /// Filesystem path.
    Path(PathBuf),
    /// Calendar date.
    Date(NaiveDate),
    /// Timestamp with offset.
    DateTime(DateTime<FixedOffset>),
    /// Value of a user-defined nominal type produced by a type decoder.
    Custom(CustomValue),
}

impl Value {
    /// Returns the name of this value's kind as used in validation messages.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "array",
            Self::Map(_) => "object",
            Self::Uuid(_) => names::UUID,
            Self::Path(_) => names::PATH,
            Self::Date(_) => names::DATE,
            Self::DateTime(_) => names::DATETIME,
            Self::Custom(custom) => custom.type_name().as_str(),
        }
    }

    /// Returns `true` if this value already is an instance of the nominal type.
    #[must_use]
    pub fn is_instance_of(&self, type_name: &TypeName) -> bool {
        match self {
            Self::Custom(custom) => custom.type_name() == type_name,
            Self::Uuid(_) | Self::Path(_) | Self::Date(_) | Self::DateTime(_) => {
                self.kind() == type_name.as_str()
            }
            _ => false,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string slice of a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer of a [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Downcasts a [`Value::Custom`] to a concrete type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(custom) => custom.downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Self::Uuid(u) => f.debug_tuple("Uuid").field(u).finish(),
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Date(d) => f.debug_tuple("Date").field(d).finish(),
            Self::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Self::Custom(custom) => custom.fmt(f),
        }
    }
}

/// A value of a user-defined nominal type.
///
/// The payload is type-erased; equality is identity of the shared payload.
#[derive(Clone)]
pub struct CustomValue {
    type_name: TypeName,
    inner: Arc<dyn Any + Send + Sync>,
}

impl CustomValue {
    /// Wraps a payload under a nominal type name.
    pub fn new<T: Any + Send + Sync>(type_name: TypeName, value: T) -> Self {
        Self {
            type_name,
            inner: Arc::new(value),
        }
    }

    /// Returns the nominal type name.
    #[must_use]
    pub const fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Downcasts the payload.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .unwrap_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN))),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"id": 5, "ratio": 0.5, "tags": ["a"], "gone": null}));
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map["id"], Value::Int(5));
        assert_eq!(map["ratio"], Value::Float(0.5));
        assert_eq!(map["tags"], Value::List(vec![Value::from("a")]));
        assert!(map["gone"].is_null());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from("x").kind(), "str");
        assert_eq!(Value::List(vec![]).kind(), "array");
        assert_eq!(Value::Map(IndexMap::new()).kind(), "object");
        assert_eq!(Value::Uuid(Uuid::nil()).kind(), "uuid");
    }

    #[test]
    fn test_is_instance_of() {
        assert!(Value::Uuid(Uuid::nil()).is_instance_of(&TypeName::new(names::UUID)));
        assert!(!Value::from("x").is_instance_of(&TypeName::new(names::UUID)));

        let user_id = TypeName::new("UserId");
        let custom = Value::Custom(CustomValue::new(user_id.clone(), 42_u64));
        assert!(custom.is_instance_of(&user_id));
        assert!(!custom.is_instance_of(&TypeName::new("OrderId")));
        assert_eq!(custom.downcast_ref::<u64>(), Some(&42));
    }

    #[test]
    fn test_custom_equality_is_identity() {
        let name = TypeName::new("UserId");
        let a = CustomValue::new(name.clone(), 1_u32);
        let b = CustomValue::new(name, 1_u32);
        assert_eq!(Value::Custom(a.clone()), Value::Custom(a.clone()));
        assert_ne!(Value::Custom(a), Value::Custom(b));
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
    }
}
