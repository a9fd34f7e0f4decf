//! Raw kwarg collection.
//!
//! Reads the raw value of every field of a [`SignatureModel`] from a
//! [`RequestConnection`]. Values are left untyped (strings from the query
//! string, headers and cookies, JSON from the body); coercion is the model's
//! job. Absent values are not inserted so the model reports them as missing.

use crate::{ExtractionError, RequestConnection};
use indexmap::IndexMap;
use meridian_core::ParamSource;
use meridian_signature::{Kwargs, ParameterSpec, SignatureModel, TypeAnnotation, Value};
use tracing::trace;

/// Collects the raw kwargs of `model` from `connection`.
///
/// Injected dependencies are skipped; the caller merges them in. `data` is
/// read from the JSON body. `headers`, `cookies` and `query` receive the
/// whole mapping. Other fields are read from their declared header or cookie,
/// a path parameter of the same name, or the query string under their alias
/// or name.
///
/// # Errors
///
/// Fails if the body is not JSON or a header value is not UTF-8.
pub fn collect_kwargs(
    connection: &RequestConnection,
    model: &SignatureModel,
) -> Result<Kwargs, ExtractionError> {
    let mut kwargs = Kwargs::new();

    for (name, parameter) in model.parameters() {
        if model.dependency_names().contains(name) {
            continue;
        }
        let value = match name.as_str() {
            "data" => read_body(connection)?,
            "headers" => Some(headers_map(connection)),
            "cookies" => Some(Value::Map(
                connection
                    .cookies()
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::from(v)))
                    .collect(),
            )),
            "query" => Some(Value::Map(
                connection
                    .query()
                    .iter()
                    .map(|(k, values)| (k.to_string(), query_value(values, values.len() > 1)))
                    .collect(),
            )),
            _ => read_parameter(connection, parameter)?,
        };
        if let Some(value) = value {
            kwargs.insert(name.clone(), value);
        }
    }

    trace!(
        handler = model.handler_name(),
        collected = kwargs.len(),
        "raw kwargs collected"
    );
    Ok(kwargs)
}

fn read_body(connection: &RequestConnection) -> Result<Option<Value>, ExtractionError> {
    if connection.body().is_empty() {
        return Ok(None);
    }
    if let Some(content_type) = connection.content_type() {
        if !is_json(content_type) {
            return Err(ExtractionError::unsupported_media_type(Some(content_type)));
        }
    }
    let json: serde_json::Value = serde_json::from_slice(connection.body())
        .map_err(|e| ExtractionError::malformed(ParamSource::Body, e.to_string()))?;
    Ok(Some(Value::from(json)))
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn headers_map(connection: &RequestConnection) -> Value {
    let mut map = IndexMap::new();
    for (name, value) in connection.headers() {
        if let Ok(value) = value.to_str() {
            map.entry(name.as_str().to_string())
                .or_insert_with(|| Value::from(value));
        }
    }
    Value::Map(map)
}

fn read_parameter(
    connection: &RequestConnection,
    parameter: &ParameterSpec,
) -> Result<Option<Value>, ExtractionError> {
    let kwarg = parameter
        .kwarg_definition
        .as_ref()
        .and_then(|definition| definition.as_parameter());

    if let Some(header) = kwarg.and_then(|k| k.header.as_deref()) {
        return Ok(connection.header(header)?.map(Value::from));
    }
    if let Some(cookie) = kwarg.and_then(|k| k.cookie.as_deref()) {
        return Ok(connection.cookies().get(cookie).map(Value::from));
    }
    if let Some(value) = connection.path_param(&parameter.name) {
        return Ok(Some(Value::from(value)));
    }

    let alias = kwarg
        .and_then(|k| k.query.as_deref())
        .unwrap_or(&parameter.name);
    Ok(connection
        .query()
        .get_all(alias)
        .map(|values| query_value(values, accepts_sequence(&parameter.annotation))))
}

fn query_value(values: &[String], as_list: bool) -> Value {
    if as_list {
        Value::List(values.iter().map(|v| Value::from(v.as_str())).collect())
    } else {
        values.first().map_or(Value::Null, |v| Value::from(v.as_str()))
    }
}

fn accepts_sequence(annotation: &TypeAnnotation) -> bool {
    match annotation {
        TypeAnnotation::List(_) => true,
        TypeAnnotation::Union(members) => members.iter().any(accepts_sequence),
        _ => false,
    }
}
