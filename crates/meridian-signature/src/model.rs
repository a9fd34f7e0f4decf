//! Signature models.
//!
//! A [`SignatureModel`] is built once per handler from its parsed signature.
//! At request time it coerces the raw kwargs collected from the connection
//! and, on failure, projects every [`CoercionFailure`] into an
//! [`ErrorMessage`] and raises exactly one [`MeridianError`]: a client
//! validation error, or an internal error when only injected dependencies
//! failed.

use crate::annotation::{FieldType, TypeAnnotation, TypeName};
use crate::coerce::{Coercer, CoercionFailure, PathSegment};
use crate::connection::Connection;
use crate::constraints::{translate, KwargDefinition};
use crate::decoders::TypeDecoders;
use crate::normalize::{create_annotation, DecoderTable};
use crate::parameter::{
    DependencyNames, ParamDefault, ParameterSpec, ParsedSignature, RESERVED_KWARGS,
};
use crate::value::Kwargs;
use indexmap::IndexMap;
use meridian_core::{ErrorMessage, MeridianError, MeridianResult, ParamSource};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Placeholder name for closures and unnamed handlers.
pub const ANONYMOUS: &str = "anonymous";

/// One field of a signature model.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureField {
    /// Parameter name.
    pub name: String,
    /// Normalized type.
    pub field_type: FieldType,
    /// Default used when the value is absent.
    pub default: ParamDefault,
}

impl SignatureField {
    /// Returns `true` when the field has no default.
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self.default, ParamDefault::Required)
    }
}

/// The validated shape of one handler's parameters.
///
/// # Example
///
/// ```
/// use meridian_signature::{
///     DependencyNames, MockConnection, ParameterSpec, ParsedSignature, SignatureModel,
///     TypeAnnotation, TypeDecoders, Value, Kwargs,
/// };
///
/// let signature = ParsedSignature::new()
///     .param(ParameterSpec::new("id", TypeAnnotation::Int))
///     .param(ParameterSpec::new("name", TypeAnnotation::optional(TypeAnnotation::Str)).with_default(Value::Null));
///
/// let model = SignatureModel::create(
///     "get_user",
///     &DependencyNames::new(),
///     false,
///     &signature,
///     &TypeDecoders::defaults(),
/// ).unwrap();
///
/// let conn = MockConnection::get("/users?id=5").with_query_param("id");
/// let mut raw = Kwargs::new();
/// raw.insert("id".to_string(), Value::from("5"));
///
/// let parsed = model.parse_values_from_connection_kwargs(&conn, raw).unwrap();
/// assert_eq!(parsed["id"], Value::Int(5));
/// assert_eq!(parsed["name"], Value::Null);
/// ```
pub struct SignatureModel {
    name: String,
    handler_name: String,
    fields: Vec<SignatureField>,
    parameters: IndexMap<String, ParameterSpec>,
    dependency_names: DependencyNames,
    return_annotation: TypeAnnotation,
    decoders: DecoderTable,
}

impl SignatureModel {
    /// Builds the model for one handler.
    ///
    /// `type_decoders` is consulted in order for every nominal type in the
    /// signature; pass the user decoders chained with
    /// [`TypeDecoders::defaults`] to keep the built-in ones.
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::ImproperlyConfigured`] when a dependency name
    /// is unknown, an explicit dependency can never be satisfied, a parameter
    /// declares more than one origin, or a pattern does not compile.
    pub fn create(
        handler_name: &str,
        dependency_names: &DependencyNames,
        has_data_dto: bool,
        parsed_signature: &ParsedSignature,
        type_decoders: &TypeDecoders,
    ) -> MeridianResult<Self> {
        let handler_name = resolve_handler_name(handler_name);
        let dependency_names =
            validate_dependencies(&handler_name, dependency_names, parsed_signature)?;

        let mut decoders = DecoderTable::new();
        let mut fields = Vec::with_capacity(parsed_signature.parameters.len());

        for parameter in parsed_signature.parameters.values() {
            let meta = match &parameter.kwarg_definition {
                Some(definition) => {
                    check_single_origin(&handler_name, parameter, definition)?;
                    translate(definition)
                        .map_err(|err| {
                            configuration_error(format!(
                                "Invalid pattern for parameter '{}' of '{handler_name}': {err}",
                                parameter.name
                            ))
                        })?
                        .map(Arc::new)
                }
                None => None,
            };

            let field_type = create_annotation(
                parameter,
                has_data_dto,
                type_decoders,
                &mut decoders,
                meta.as_ref(),
            );

            fields.push(SignatureField {
                name: parameter.name.clone(),
                field_type,
                default: parameter.default.clone(),
            });
        }

        debug!(
            handler = %handler_name,
            fields = fields.len(),
            dependencies = dependency_names.len(),
            decoders = decoders.len(),
            "signature model created"
        );

        Ok(Self {
            name: format!("{handler_name}_signature_model"),
            handler_name,
            fields,
            parameters: parsed_signature.parameters.clone(),
            dependency_names,
            return_annotation: parsed_signature.return_type.clone(),
            decoders,
        })
    }

    /// Model name, `{handler}_signature_model`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handler name used in diagnostics.
    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[SignatureField] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SignatureField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Declared parameters by name.
    #[must_use]
    pub fn parameters(&self) -> &IndexMap<String, ParameterSpec> {
        &self.parameters
    }

    /// Names of injected dependencies, including explicit ones.
    #[must_use]
    pub fn dependency_names(&self) -> &DependencyNames {
        &self.dependency_names
    }

    /// Declared return type.
    #[must_use]
    pub fn return_annotation(&self) -> &TypeAnnotation {
        &self.return_annotation
    }

    /// Returns `true` if a decoder was resolved for `name`.
    #[must_use]
    pub fn has_decoder(&self, name: &TypeName) -> bool {
        self.decoders.contains_key(name)
    }

    /// Coerces raw kwargs into the handler's parameter values.
    ///
    /// Absent fields take their default. Kwargs the handler does not declare
    /// are dropped. The result is in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Validation`] when at least one client-supplied
    /// value fails, or [`MeridianError::Internal`] when only injected
    /// dependencies fail.
    pub fn parse_values_from_connection_kwargs(
        &self,
        connection: &dyn Connection,
        mut kwargs: Kwargs,
    ) -> MeridianResult<Kwargs> {
        let coercer = Coercer::new(&self.decoders, connection.default_deserializer());
        let mut values = Kwargs::with_capacity(self.fields.len());
        let mut failures: Vec<CoercionFailure> = Vec::new();

        for field in &self.fields {
            let segment = PathSegment::Key(field.name.clone());
            match kwargs.shift_remove(&field.name) {
                Some(raw) => match coercer.coerce(&field.field_type, raw) {
                    Ok(value) => {
                        values.insert(field.name.clone(), value);
                    }
                    Err(errs) => failures.extend(
                        errs.into_iter()
                            .map(|failure| failure.within(segment.clone())),
                    ),
                },
                None => match &field.default {
                    ParamDefault::Value(default) => {
                        values.insert(field.name.clone(), default.clone());
                    }
                    ParamDefault::Required => failures.push(
                        CoercionFailure::new(format!(
                            "Object missing required field `{}`",
                            field.name
                        ))
                        .within(segment),
                    ),
                },
            }
        }

        if failures.is_empty() {
            return Ok(values);
        }

        let messages = failures
            .iter()
            .map(|failure| {
                self.build_error_message(&failure.keys(), &failure.to_string(), connection)
            })
            .collect();
        Err(self.create_exception(connection, messages))
    }

    /// Projects one failure into a client-facing message.
    ///
    /// The message is cut at the first `" - "`. A first key of `data` marks
    /// the body and is stripped from the joined key. Otherwise the source is
    /// the query string when the connection carries the key, then the
    /// parameter's cookie or header origin, and the query string by default.
    #[must_use]
    pub fn build_error_message(
        &self,
        keys: &[String],
        message: &str,
        connection: &dyn Connection,
    ) -> ErrorMessage {
        let text = message.split(" - ").next().unwrap_or(message);
        let error_message = ErrorMessage::new(text);

        let Some(first) = keys.first() else {
            return error_message;
        };
        let key = keys.join(".");

        if first == "data" {
            let key = key.strip_prefix("data.").unwrap_or(&key).to_string();
            return error_message.with_key(key).with_source(ParamSource::Body);
        }

        let source = if connection.has_query_param(&key) {
            ParamSource::Query
        } else {
            match self.parameters.get(first).and_then(ParameterSpec::origin) {
                Some(ParamSource::Cookie) => ParamSource::Cookie,
                Some(ParamSource::Header) => ParamSource::Header,
                _ => ParamSource::Query,
            }
        };
        error_message.with_key(key).with_source(source)
    }

    /// Turns projected messages into the single error surfaced for a request.
    ///
    /// Messages without a key, or whose key is not an injected dependency,
    /// are client errors. If there are none left, the failure is internal and
    /// its detail is only logged.
    #[must_use]
    pub fn create_exception(
        &self,
        connection: &dyn Connection,
        messages: Vec<ErrorMessage>,
    ) -> MeridianError {
        let method = connection.method().unwrap_or("websocket");
        let (client, dependency): (Vec<_>, Vec<_>) = messages
            .into_iter()
            .partition(|message| self.is_client_message(message));

        if client.is_empty() {
            error!(
                handler = %self.handler_name,
                method,
                url = connection.url(),
                failures = ?dependency,
                "injected dependency failed validation"
            );
            return MeridianError::internal_server();
        }

        debug!(
            handler = %self.handler_name,
            method,
            url = connection.url(),
            errors = client.len(),
            "request validation failed"
        );
        MeridianError::validation(
            format!("Validation failed for {method} {}", connection.url()),
            client,
        )
    }

    fn is_client_message(&self, message: &ErrorMessage) -> bool {
        message
            .key
            .as_deref()
            .map_or(true, |key| !self.dependency_names.contains(key))
    }
}

impl fmt::Debug for SignatureModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureModel")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("dependency_names", &self.dependency_names)
            .field("return_annotation", &self.return_annotation)
            .field("decoders", &self.decoders.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Resolves closures and unnamed handlers to [`ANONYMOUS`].
#[must_use]
pub fn resolve_handler_name(name: &str) -> String {
    let anonymous =
        name.is_empty() || name == "<lambda>" || name == "<closure>" || name.contains("{{closure}}");
    if anonymous {
        ANONYMOUS.to_string()
    } else {
        name.to_string()
    }
}

fn configuration_error(message: String) -> MeridianError {
    warn!(%message, "signature model rejected");
    MeridianError::improperly_configured(message)
}

fn validate_dependencies(
    handler_name: &str,
    dependency_names: &DependencyNames,
    parsed_signature: &ParsedSignature,
) -> MeridianResult<DependencyNames> {
    if let Some(unknown) = dependency_names.iter().find(|name| {
        !parsed_signature.parameters.contains_key(name.as_str())
            && !RESERVED_KWARGS.contains(&name.as_str())
    }) {
        return Err(configuration_error(format!(
            "Dependency '{unknown}' of '{handler_name}' is not a parameter of the handler"
        )));
    }

    let mut names = dependency_names.clone();
    for parameter in parsed_signature.parameters.values() {
        let explicit = parameter
            .kwarg_definition
            .as_ref()
            .is_some_and(KwargDefinition::is_dependency);
        if !explicit || dependency_names.contains(&parameter.name) {
            continue;
        }
        if !parameter.is_optional() && !parameter.has_default() {
            return Err(configuration_error(format!(
                "Explicit dependency '{}' for '{handler_name}' has no default value, or provided dependency",
                parameter.name
            )));
        }
        names.insert(parameter.name.clone());
    }
    Ok(names)
}

fn check_single_origin(
    handler_name: &str,
    parameter: &ParameterSpec,
    definition: &KwargDefinition,
) -> MeridianResult<()> {
    match definition.as_parameter() {
        Some(kwarg) if kwarg.origin_count() > 1 => Err(configuration_error(format!(
            "Parameter '{}' of '{handler_name}' declares more than one of query, header and cookie",
            parameter.name
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MockConnection;
    use crate::constraints::{DependencyKwarg, ParameterKwarg};
    use crate::value::Value;

    fn build(signature: &ParsedSignature, dependencies: &[&str]) -> MeridianResult<SignatureModel> {
        let names = dependencies.iter().map(ToString::to_string).collect();
        SignatureModel::create("handler", &names, false, signature, &TypeDecoders::defaults())
    }

    fn keys(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_anonymous_names() {
        assert_eq!(resolve_handler_name("<lambda>"), "anonymous");
        assert_eq!(resolve_handler_name(""), "anonymous");
        assert_eq!(resolve_handler_name("app::main::{{closure}}"), "anonymous");
        assert_eq!(resolve_handler_name("list_users"), "list_users");

        let model = SignatureModel::create(
            "<lambda>",
            &DependencyNames::new(),
            false,
            &ParsedSignature::new(),
            &TypeDecoders::new(),
        )
        .unwrap();
        assert_eq!(model.name(), "anonymous_signature_model");
    }

    #[test]
    fn test_unknown_dependency_is_rejected() {
        let signature = ParsedSignature::new().param(ParameterSpec::new("id", TypeAnnotation::Int));
        let err = build(&signature, &["cache"]).unwrap_err();
        assert!(matches!(err, MeridianError::ImproperlyConfigured { .. }));
        assert!(err.to_string().contains("cache"));

        assert!(build(&signature, &["state"]).is_ok());
    }

    #[test]
    fn test_explicit_dependency_rules() {
        let required = ParsedSignature::new().param(
            ParameterSpec::new("db", TypeAnnotation::named("Pool"))
                .with_kwarg(DependencyKwarg::default()),
        );
        assert!(build(&required, &[]).is_err());
        assert!(build(&required, &["db"]).is_ok());

        let optional = ParsedSignature::new().param(
            ParameterSpec::new("db", TypeAnnotation::optional(TypeAnnotation::named("Pool")))
                .with_kwarg(DependencyKwarg::default()),
        );
        let model = build(&optional, &[]).unwrap();
        assert!(model.dependency_names().contains("db"));
    }

    #[test]
    fn test_multiple_origins_rejected() {
        let mut kwarg = ParameterKwarg::header("x-token");
        kwarg.cookie = Some("token".to_string());
        let signature = ParsedSignature::new()
            .param(ParameterSpec::new("token", TypeAnnotation::Str).with_kwarg(kwarg));
        assert!(build(&signature, &[]).is_err());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let signature = ParsedSignature::new().param(
            ParameterSpec::new("slug", TypeAnnotation::Str)
                .with_kwarg(ParameterKwarg::default().pattern("(")),
        );
        let err = build(&signature, &[]).unwrap_err();
        assert!(err.to_string().contains("slug"));
    }

    #[test]
    fn test_model_records_signature() {
        let signature = ParsedSignature::new()
            .param(ParameterSpec::new("id", TypeAnnotation::named("uuid")))
            .returns(TypeAnnotation::Str);
        let model = build(&signature, &[]).unwrap();
        assert_eq!(model.fields().len(), 1);
        assert!(model.fields()[0].is_required());
        assert!(model.has_decoder(&TypeName::new("uuid")));
        assert_eq!(model.return_annotation(), &TypeAnnotation::Str);
        assert!(model.parameters().contains_key("id"));
    }

    #[test]
    fn test_build_error_message_sources() {
        let signature = ParsedSignature::new()
            .param(ParameterSpec::new("id", TypeAnnotation::Int))
            .param(
                ParameterSpec::new("session", TypeAnnotation::Str)
                    .with_kwarg(ParameterKwarg::cookie("sid")),
            )
            .param(
                ParameterSpec::new("version", TypeAnnotation::Int)
                    .with_kwarg(ParameterKwarg::header("x-version")),
            );
        let model = build(&signature, &[]).unwrap();
        let conn = MockConnection::get("/?id=x").with_query_param("id");

        let msg = model.build_error_message(&keys(&["id"]), "Expected `int` - at `$.id`", &conn);
        assert_eq!(msg.message, "Expected `int`");
        assert_eq!(msg.source, Some(ParamSource::Query));

        let msg = model.build_error_message(&keys(&["session"]), "bad", &conn);
        assert_eq!(msg.source, Some(ParamSource::Cookie));

        let msg = model.build_error_message(&keys(&["version"]), "bad", &conn);
        assert_eq!(msg.source, Some(ParamSource::Header));

        let msg = model.build_error_message(&keys(&["other"]), "bad", &conn);
        assert_eq!(msg.source, Some(ParamSource::Query));

        let msg = model.build_error_message(&keys(&["data", "items", "0"]), "bad", &conn);
        assert_eq!(msg.key.as_deref(), Some("items.0"));
        assert_eq!(msg.source, Some(ParamSource::Body));

        let msg = model.build_error_message(&[], "Expected `object`", &conn);
        assert!(msg.key.is_none());
        assert!(msg.source.is_none());
    }

    #[test]
    fn test_create_exception_partitions_dependencies() {
        let signature = ParsedSignature::new()
            .param(ParameterSpec::new("id", TypeAnnotation::Int))
            .param(ParameterSpec::new("db", TypeAnnotation::Any));
        let model = build(&signature, &["db"]).unwrap();
        let conn = MockConnection::new("POST", "/items");

        let err = model.create_exception(
            &conn,
            vec![
                ErrorMessage::new("bad").with_key("db"),
                ErrorMessage::new("bad").with_key("id"),
                ErrorMessage::new("no key"),
            ],
        );
        assert_eq!(err.to_string(), "Validation failed for POST /items");
        assert_eq!(err.messages().len(), 2);

        let err = model.create_exception(&conn, vec![ErrorMessage::new("bad").with_key("db")]);
        assert!(matches!(err, MeridianError::Internal { .. }));
        assert!(err.messages().is_empty());
    }

    #[test]
    fn test_websocket_method_fallback() {
        let model = build(&ParsedSignature::new(), &[]).unwrap();
        let err = model.create_exception(
            &MockConnection::websocket("/ws"),
            vec![ErrorMessage::new("bad").with_key("x")],
        );
        assert_eq!(err.to_string(), "Validation failed for websocket /ws");
    }

    #[test]
    fn test_defaults_are_not_coerced() {
        let signature = ParsedSignature::new()
            .param(ParameterSpec::new("limit", TypeAnnotation::Int).with_default(Value::from("ten")));
        let model = build(&signature, &[]).unwrap();
        let out = model
            .parse_values_from_connection_kwargs(&MockConnection::get("/"), Kwargs::new())
            .unwrap();
        assert_eq!(out["limit"], Value::from("ten"));
    }

    #[test]
    fn test_undeclared_kwargs_are_dropped() {
        let signature = ParsedSignature::new().param(ParameterSpec::new("id", TypeAnnotation::Int));
        let model = build(&signature, &[]).unwrap();
        let mut raw = Kwargs::new();
        raw.insert("id".to_string(), Value::Int(1));
        raw.insert("extra".to_string(), Value::Bool(true));
        let out = model
            .parse_values_from_connection_kwargs(&MockConnection::get("/"), raw)
            .unwrap();
        assert_eq!(out.len(), 1);
    }
}
