//! Declarative parameter constraints and their structural metadata.
//!
//! Handlers describe parameters with a [`KwargDefinition`]: where the value
//! comes from (query alias, header, cookie, body) and which rules it must
//! satisfy. [`translate`] turns that definition into a [`Meta`], the compact
//! form the coercion engine enforces. Attributes the engine does not enforce
//! are kept in [`Meta::extra`] so documentation generators can still see them.

use indexmap::IndexMap;
use meridian_core::ParamSource;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::fmt;

/// Names of the constraint keys enforced during coercion.
pub const CONSTRAINT_FIELDS: [&str; 8] = [
    "gt",
    "ge",
    "lt",
    "le",
    "multiple_of",
    "pattern",
    "min_length",
    "max_length",
];

/// Validation rules shared by every kind of kwarg definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// Exclusive lower bound.
    pub gt: Option<f64>,
    /// Inclusive lower bound.
    pub ge: Option<f64>,
    /// Exclusive upper bound.
    pub lt: Option<f64>,
    /// Inclusive upper bound.
    pub le: Option<f64>,
    /// Value must be a multiple of this number.
    pub multiple_of: Option<f64>,
    /// Regular expression a string must match (search semantics).
    pub pattern: Option<String>,
    /// Minimum length of a string, bytes, list or map.
    pub min_length: Option<usize>,
    /// Maximum length of a string, bytes, list or map.
    pub max_length: Option<usize>,
    /// Alias of `min_length` for collections.
    pub min_items: Option<usize>,
    /// Alias of `max_length` for collections.
    pub max_items: Option<usize>,
}

/// Documentation attributes carried alongside constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Documentation {
    /// Short title.
    pub title: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Example values.
    pub examples: Vec<JsonValue>,
}

/// A parameter read from the query string, a header or a cookie.
///
/// # Example
///
/// ```
/// use meridian_signature::{KwargDefinition, ParameterKwarg};
/// use meridian_core::ParamSource;
///
/// let kwarg = ParameterKwarg::cookie("session").min_length(16);
/// assert_eq!(kwarg.origin(), Some(ParamSource::Cookie));
/// let _ = KwargDefinition::from(kwarg);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterKwarg {
    /// Query string alias.
    pub query: Option<String>,
    /// Header name.
    pub header: Option<String>,
    /// Cookie name.
    pub cookie: Option<String>,
    /// Explicit required flag for documentation.
    pub required: Option<bool>,
    /// Documentation attributes.
    pub docs: Documentation,
    /// Validation rules.
    pub constraints: Constraints,
    /// Opaque extension attributes.
    pub extra: IndexMap<String, JsonValue>,
}

impl ParameterKwarg {
    /// A query parameter read under a different name.
    #[must_use]
    pub fn query(alias: impl Into<String>) -> Self {
        Self {
            query: Some(alias.into()),
            ..Self::default()
        }
    }

    /// A header parameter.
    #[must_use]
    pub fn header(name: impl Into<String>) -> Self {
        Self {
            header: Some(name.into()),
            ..Self::default()
        }
    }

    /// A cookie parameter.
    #[must_use]
    pub fn cookie(name: impl Into<String>) -> Self {
        Self {
            cookie: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns the declared origin, header and cookie taking precedence.
    #[must_use]
    pub fn origin(&self) -> Option<ParamSource> {
        if self.cookie.is_some() {
            Some(ParamSource::Cookie)
        } else if self.header.is_some() {
            Some(ParamSource::Header)
        } else if self.query.is_some() {
            Some(ParamSource::Query)
        } else {
            None
        }
    }

    /// Number of origin flags set. More than one is a wiring error.
    #[must_use]
    pub fn origin_count(&self) -> usize {
        [&self.query, &self.header, &self.cookie]
            .iter()
            .filter(|origin| origin.is_some())
            .count()
    }

    /// Sets `ge`.
    #[must_use]
    pub fn ge(mut self, bound: f64) -> Self {
        self.constraints.ge = Some(bound);
        self
    }

    /// Sets `le`.
    #[must_use]
    pub fn le(mut self, bound: f64) -> Self {
        self.constraints.le = Some(bound);
        self
    }

    /// Sets `min_length`.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.constraints.min_length = Some(len);
        self
    }

    /// Sets `max_length`.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.constraints.max_length = Some(len);
        self
    }

    /// Sets `pattern`.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// Replaces all constraints.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// A request body definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyKwarg {
    /// Declared media type, e.g. `application/json`.
    pub media_type: Option<String>,
    /// Documentation attributes.
    pub docs: Documentation,
    /// Validation rules.
    pub constraints: Constraints,
    /// Opaque extension attributes.
    pub extra: IndexMap<String, JsonValue>,
}

/// An explicitly declared dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyKwarg {
    /// Accept the injected value as is, without coercion.
    pub skip_validation: bool,
}

/// How a handler parameter is declared.
#[derive(Debug, Clone, PartialEq)]
pub enum KwargDefinition {
    /// Query, header or cookie parameter.
    Parameter(ParameterKwarg),
    /// Request body.
    Body(BodyKwarg),
    /// Injected dependency.
    Dependency(DependencyKwarg),
}

impl KwargDefinition {
    /// Returns the parameter definition, if this is one.
    #[must_use]
    pub const fn as_parameter(&self) -> Option<&ParameterKwarg> {
        match self {
            Self::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    /// Returns `true` for explicit dependencies.
    #[must_use]
    pub const fn is_dependency(&self) -> bool {
        matches!(self, Self::Dependency(_))
    }
}

impl From<ParameterKwarg> for KwargDefinition {
    fn from(value: ParameterKwarg) -> Self {
        Self::Parameter(value)
    }
}

impl From<BodyKwarg> for KwargDefinition {
    fn from(value: BodyKwarg) -> Self {
        Self::Body(value)
    }
}

impl From<DependencyKwarg> for KwargDefinition {
    fn from(value: DependencyKwarg) -> Self {
        Self::Dependency(value)
    }
}

/// A compiled `pattern` constraint.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
        })
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns `true` if the pattern matches anywhere in `value`.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural constraint metadata attached to a normalized field type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    /// Exclusive lower bound.
    pub gt: Option<f64>,
    /// Inclusive lower bound.
    pub ge: Option<f64>,
    /// Exclusive upper bound.
    pub lt: Option<f64>,
    /// Inclusive upper bound.
    pub le: Option<f64>,
    /// Multiple-of constraint.
    pub multiple_of: Option<f64>,
    /// Compiled pattern.
    pub pattern: Option<Pattern>,
    /// Minimum length.
    pub min_length: Option<usize>,
    /// Maximum length.
    pub max_length: Option<usize>,
    /// Attributes not enforced during coercion.
    pub extra: IndexMap<String, JsonValue>,
}

impl Meta {
    /// Returns `true` if no enforced constraint is set.
    #[must_use]
    pub fn has_no_constraints(&self) -> bool {
        self.gt.is_none()
            && self.ge.is_none()
            && self.lt.is_none()
            && self.le.is_none()
            && self.multiple_of.is_none()
            && self.pattern.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
    }
}

/// Translates a kwarg definition into structural metadata.
///
/// Dependencies carry no constraints and translate to `None`.
///
/// # Errors
///
/// Returns the regex error when `pattern` does not compile.
pub fn translate(definition: &KwargDefinition) -> Result<Option<Meta>, regex::Error> {
    let mut extra = IndexMap::new();
    let (constraints, docs, extension) = match definition {
        KwargDefinition::Dependency(_) => return Ok(None),
        KwargDefinition::Parameter(parameter) => {
            insert_str(&mut extra, "query", parameter.query.as_deref());
            insert_str(&mut extra, "header", parameter.header.as_deref());
            insert_str(&mut extra, "cookie", parameter.cookie.as_deref());
            if let Some(required) = parameter.required {
                extra.insert("required".to_string(), JsonValue::Bool(required));
            }
            (&parameter.constraints, &parameter.docs, &parameter.extra)
        }
        KwargDefinition::Body(body) => {
            insert_str(&mut extra, "media_type", body.media_type.as_deref());
            (&body.constraints, &body.docs, &body.extra)
        }
    };

    insert_str(&mut extra, "title", docs.title.as_deref());
    insert_str(&mut extra, "description", docs.description.as_deref());
    if !docs.examples.is_empty() {
        extra.insert(
            "examples".to_string(),
            JsonValue::Array(docs.examples.clone()),
        );
    }
    for (key, value) in extension {
        if !is_empty_json(value) {
            extra.insert(key.clone(), value.clone());
        }
    }

    Ok(Some(Meta {
        gt: constraints.gt,
        ge: constraints.ge,
        lt: constraints.lt,
        le: constraints.le,
        multiple_of: constraints.multiple_of,
        pattern: constraints.pattern.as_deref().map(Pattern::new).transpose()?,
        min_length: constraints
            .min_length
            .or(constraints.min_items.filter(|&n| n > 0)),
        max_length: constraints
            .max_length
            .or(constraints.max_items.filter(|&n| n > 0)),
        extra,
    }))
}

fn insert_str(extra: &mut IndexMap<String, JsonValue>, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        extra.insert(key.to_string(), JsonValue::String(value.to_string()));
    }
}

fn is_empty_json(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        JsonValue::Bool(_) | JsonValue::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_keys_map_directly() {
        let kwarg = ParameterKwarg::default().with_constraints(Constraints {
            gt: Some(1.0),
            le: Some(10.0),
            multiple_of: Some(2.0),
            pattern: Some("^[0-9]+$".to_string()),
            ..Constraints::default()
        });

        let meta = translate(&kwarg.into()).unwrap().unwrap();
        assert_eq!(meta.gt, Some(1.0));
        assert_eq!(meta.le, Some(10.0));
        assert_eq!(meta.multiple_of, Some(2.0));
        assert_eq!(meta.pattern.unwrap().as_str(), "^[0-9]+$");
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_items_are_renamed_to_length() {
        let kwarg = ParameterKwarg::default().with_constraints(Constraints {
            min_items: Some(1),
            max_items: Some(5),
            ..Constraints::default()
        });

        let meta = translate(&kwarg.into()).unwrap().unwrap();
        assert_eq!(meta.min_length, Some(1));
        assert_eq!(meta.max_length, Some(5));
    }

    #[test]
    fn test_zero_item_counts_are_dropped() {
        let kwarg = ParameterKwarg::default().with_constraints(Constraints {
            min_items: Some(0),
            max_items: Some(0),
            ..Constraints::default()
        });

        let meta = translate(&kwarg.into()).unwrap().unwrap();
        assert_eq!(meta.min_length, None);
        assert_eq!(meta.max_length, None);
    }

    #[test]
    fn test_explicit_length_wins_over_items() {
        let kwarg = ParameterKwarg::default().with_constraints(Constraints {
            min_length: Some(3),
            min_items: Some(1),
            ..Constraints::default()
        });

        let meta = translate(&kwarg.into()).unwrap().unwrap();
        assert_eq!(meta.min_length, Some(3));
    }

    #[test]
    fn test_unknown_keys_go_to_extra() {
        let mut kwarg = ParameterKwarg::header("x-api-version");
        kwarg.docs.title = Some("API version".to_string());
        kwarg.extra.insert("lower_case".to_string(), json!(true));
        kwarg.extra.insert("empty".to_string(), json!(""));

        let meta = translate(&kwarg.into()).unwrap().unwrap();
        assert!(meta.has_no_constraints());
        assert_eq!(meta.extra["header"], json!("x-api-version"));
        assert_eq!(meta.extra["title"], json!("API version"));
        assert_eq!(meta.extra["lower_case"], json!(true));
        assert!(!meta.extra.contains_key("empty"));
        assert!(!meta.extra.contains_key("cookie"));
    }

    #[test]
    fn test_body_media_type_goes_to_extra() {
        let body = BodyKwarg {
            media_type: Some("application/json".to_string()),
            ..BodyKwarg::default()
        };
        let meta = translate(&body.into()).unwrap().unwrap();
        assert_eq!(meta.extra["media_type"], json!("application/json"));
    }

    #[test]
    fn test_dependency_has_no_meta() {
        let meta = translate(&DependencyKwarg::default().into()).unwrap();
        assert!(meta.is_none());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let kwarg = ParameterKwarg::default().pattern("([a-z");
        assert!(translate(&kwarg.into()).is_err());
    }

    #[test]
    fn test_origin() {
        assert_eq!(ParameterKwarg::query("q").origin(), Some(ParamSource::Query));
        assert_eq!(ParameterKwarg::header("h").origin(), Some(ParamSource::Header));
        assert_eq!(ParameterKwarg::default().origin(), None);

        let mut both = ParameterKwarg::header("h");
        both.cookie = Some("c".to_string());
        assert_eq!(both.origin_count(), 2);
    }
}
