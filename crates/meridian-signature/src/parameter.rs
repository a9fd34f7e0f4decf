//! Parsed handler signatures.

use crate::annotation::TypeAnnotation;
use crate::constraints::KwargDefinition;
use crate::value::Value;
use indexmap::IndexMap;
use meridian_core::ParamSource;
use std::collections::BTreeSet;

/// Names of parameters supplied by dependency injection.
pub type DependencyNames = BTreeSet<String>;

/// Names that may be requested as dependencies without being declared as
/// parameters, because the framework injects them itself.
pub const RESERVED_KWARGS: [&str; 9] = [
    "state", "headers", "cookies", "request", "socket", "data", "query", "scope", "body",
];

/// Parameters that are never validated.
pub const SKIP_VALIDATION_NAMES: [&str; 5] = ["request", "socket", "scope", "receive", "send"];

/// Default of a parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamDefault {
    /// No default, the value must be supplied.
    #[default]
    Required,
    /// Used when the value is absent.
    Value(Value),
}

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub annotation: TypeAnnotation,
    /// Default value.
    pub default: ParamDefault,
    /// Declared origin and constraints.
    pub kwarg_definition: Option<KwargDefinition>,
}

impl ParameterSpec {
    /// A required parameter without constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, annotation: TypeAnnotation) -> Self {
        Self {
            name: name.into(),
            annotation,
            default: ParamDefault::Required,
            kwarg_definition: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = ParamDefault::Value(default.into());
        self
    }

    /// Sets the kwarg definition.
    #[must_use]
    pub fn with_kwarg(mut self, definition: impl Into<KwargDefinition>) -> Self {
        self.kwarg_definition = Some(definition.into());
        self
    }

    /// Returns `true` when a default is declared.
    #[must_use]
    pub fn has_default(&self) -> bool {
        matches!(self.default, ParamDefault::Value(_))
    }

    /// Returns `true` when the declared type accepts `None`.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.annotation.is_optional()
    }

    /// Origin declared by a header, cookie or query kwarg.
    #[must_use]
    pub fn origin(&self) -> Option<ParamSource> {
        match &self.kwarg_definition {
            Some(KwargDefinition::Parameter(parameter)) => parameter.origin(),
            Some(KwargDefinition::Body(_)) => Some(ParamSource::Body),
            _ => None,
        }
    }
}

/// A handler's parameter list and return type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSignature {
    /// Parameters keyed by name, in declaration order.
    pub parameters: IndexMap<String, ParameterSpec>,
    /// Declared return type, kept for introspection.
    pub return_type: TypeAnnotation,
}

impl ParsedSignature {
    /// An empty signature returning `None`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parameters: IndexMap::new(),
            return_type: TypeAnnotation::None,
        }
    }

    /// Appends a parameter, replacing any previous one with the same name.
    #[must_use]
    pub fn param(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.insert(parameter.name.clone(), parameter);
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn returns(mut self, return_type: TypeAnnotation) -> Self {
        self.return_type = return_type;
        self
    }
}

impl Default for ParsedSignature {
    fn default() -> Self {
        Self::new()
    }
}
