//! Declared and normalized parameter types.
//!
//! A handler declares each parameter with a [`TypeAnnotation`]. At
//! registration time the annotation is normalized into a [`FieldType`], the
//! canonical form the coercion engine walks.

use crate::constraints::Meta;
use std::fmt;
use std::sync::Arc;

/// Names of the nominal types covered by the default type decoders.
pub mod names {
    /// `uuid::Uuid`.
    pub const UUID: &str = "uuid";
    /// `std::path::PathBuf`.
    pub const PATH: &str = "path";
    /// `chrono::NaiveDate`, ISO 8601 `YYYY-MM-DD`.
    pub const DATE: &str = "date";
    /// `chrono::DateTime<FixedOffset>`, RFC 3339.
    pub const DATETIME: &str = "datetime";
}

/// Name of a nominal type, such as `uuid` or a domain identifier like `UserId`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Creates a type name.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A parameter's declared type.
///
/// `Optional[T]` is spelled `Union([T, None])`; see [`TypeAnnotation::optional`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    /// Accepts anything, no validation.
    Any,
    /// The `None` type.
    None,
    /// Boolean.
    Bool,
    /// Integer.
    Int,
    /// Float.
    Float,
    /// String.
    Str,
    /// Bytes (base64 when given as a string).
    Bytes,
    /// Homogeneous list.
    List(Box<TypeAnnotation>),
    /// String-keyed map.
    Map(Box<TypeAnnotation>),
    /// Record with named properties, typically a request body.
    Object(ObjectAnnotation),
    /// Union of alternatives.
    Union(Vec<TypeAnnotation>),
    /// Nominal type decoded by a type decoder or the default deserializer.
    Named(TypeName),
}

impl TypeAnnotation {
    /// `Optional[inner]`.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Union(vec![inner, Self::None])
    }

    /// `list[inner]`.
    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// `dict[str, inner]`.
    #[must_use]
    pub fn map(inner: Self) -> Self {
        Self::Map(Box::new(inner))
    }

    /// A nominal type.
    #[must_use]
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::Named(TypeName::new(name))
    }

    /// Returns `true` for unions, including optionals.
    #[must_use]
    pub const fn is_union(&self) -> bool {
        matches!(self, Self::Union(_))
    }

    /// Returns `true` for unions containing `None`.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        match self {
            Self::Union(members) => members.iter().any(|m| matches!(m, Self::None)),
            _ => false,
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::None => f.write_str("None"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Bytes => f.write_str("bytes"),
            Self::List(inner) => write!(f, "list[{inner}]"),
            Self::Map(inner) => write!(f, "dict[str, {inner}]"),
            Self::Object(object) => f.write_str(&object.name),
            Self::Union(members) => write_joined(f, members),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Declared shape of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAnnotation {
    /// Type name, used for display only.
    pub name: String,
    /// Properties in declaration order.
    pub properties: Vec<PropertyAnnotation>,
}

impl ObjectAnnotation {
    /// Creates an object annotation without properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Adds a required property.
    #[must_use]
    pub fn required(mut self, name: impl Into<String>, annotation: TypeAnnotation) -> Self {
        self.properties.push(PropertyAnnotation {
            name: name.into(),
            annotation,
            required: true,
        });
        self
    }

    /// Adds an optional property, omitted from the output when absent.
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, annotation: TypeAnnotation) -> Self {
        self.properties.push(PropertyAnnotation {
            name: name.into(),
            annotation,
            required: false,
        });
        self
    }
}

/// One property of an [`ObjectAnnotation`].
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAnnotation {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub annotation: TypeAnnotation,
    /// Whether the property must be present.
    pub required: bool,
}

/// A normalized type, ready for structural coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Accepts anything.
    Any,
    /// Only `null`.
    None,
    /// Boolean.
    Bool,
    /// Integer.
    Int,
    /// Float.
    Float,
    /// String.
    Str,
    /// Bytes.
    Bytes,
    /// Homogeneous list.
    List(Box<FieldType>),
    /// String-keyed map.
    Map(Box<FieldType>),
    /// Record.
    Object(ObjectType),
    /// `null` or the inner type.
    Optional(Box<FieldType>),
    /// First matching alternative.
    Union(Vec<FieldType>),
    /// Nominal type resolved through the model's decoder table.
    Named(TypeName),
    /// Inner type with constraint metadata enforced after coercion.
    Constrained(Box<FieldType>, Arc<Meta>),
}

impl FieldType {
    /// Returns the constraint metadata attached at the top level, if any.
    #[must_use]
    pub fn meta(&self) -> Option<&Meta> {
        match self {
            Self::Constrained(_, meta) => Some(meta),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::None => f.write_str("null"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Bytes => f.write_str("bytes"),
            Self::List(_) => f.write_str("array"),
            Self::Map(_) | Self::Object(_) => f.write_str("object"),
            Self::Optional(inner) => write!(f, "{inner} | null"),
            Self::Union(members) => write_joined(f, members),
            Self::Named(name) => write!(f, "{name}"),
            Self::Constrained(inner, _) => write!(f, "{inner}"),
        }
    }
}

/// Normalized record type.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    /// Type name.
    pub name: String,
    /// Properties in declaration order.
    pub fields: Vec<ObjectField>,
}

/// One normalized property.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    /// Property name.
    pub name: String,
    /// Normalized type.
    pub field_type: FieldType,
    /// Whether the property must be present.
    pub required: bool,
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, members: &[T]) -> fmt::Result {
    for (idx, member) in members.iter().enumerate() {
        if idx > 0 {
            f.write_str(" | ")?;
        }
        write!(f, "{member}")?;
    }
    Ok(())
}
