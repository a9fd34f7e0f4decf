//! Structural coercion of raw values against normalized field types.
//!
//! Coercion walks a [`FieldType`] and a [`Value`] together. Values that
//! already have the target type pass through unchanged. In
//! [`CoercionMode::Lax`] strings coming from query strings, headers and
//! cookies are also converted to numbers and booleans. Failures are collected
//! as [`CoercionFailure`]s, each carrying the path to the offending value.

use crate::annotation::{FieldType, ObjectType, TypeName};
use crate::constraints::Meta;
use crate::decoders::{DecodeError, DefaultDeserializer};
use crate::normalize::DecoderTable;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use indexmap::IndexMap;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// One step of the path from the coerced record to a failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object property or map key.
    Key(String),
    /// List index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// A value that failed to coerce, with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFailure {
    /// Location, outermost segment first. Empty for the record itself.
    pub path: Vec<PathSegment>,
    /// Message without location suffix.
    pub message: String,
}

impl CoercionFailure {
    /// A failure at the current location.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// A failure for a value of the wrong kind.
    #[must_use]
    pub fn unexpected(expected: impl fmt::Display, value: &Value) -> Self {
        Self::new(format!("Expected `{expected}`, got `{}`", value.kind()))
    }

    /// Builds a failure from a decoder error. A trailing `` `$.<path>` ``
    /// in the message becomes a nested key.
    #[must_use]
    pub fn from_decode_error(error: &DecodeError) -> Self {
        let text = error.message();
        let message = text.split(" - ").next().unwrap_or(text).to_string();
        let path = nested_path_re()
            .and_then(|re| re.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| vec![PathSegment::Key(m.as_str().to_string())])
            .unwrap_or_default();
        Self { path, message }
    }

    /// Prepends a segment to the path.
    #[must_use]
    pub fn within(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Path segments rendered as strings, indices included.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.path.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if self.path.is_empty() {
            return Ok(());
        }
        f.write_str(" - at `$")?;
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        f.write_str("`")
    }
}

fn nested_path_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`\$\.(.+)`$").ok()).as_ref()
}

/// Result of coercing one value.
pub type CoercionResult = Result<Value, Vec<CoercionFailure>>;

/// Whether strings may be converted to other scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionMode {
    /// Only exact kinds, plus int to float.
    Strict,
    /// Also string to int, float, bool and null, int to bool, and integral
    /// float to int.
    Lax,
}

/// Coerces values using a model's decoder table and a fallback deserializer.
#[derive(Clone, Copy)]
pub struct Coercer<'a> {
    decoders: &'a DecoderTable,
    fallback: &'a dyn DefaultDeserializer,
    mode: CoercionMode,
}

impl<'a> Coercer<'a> {
    /// Creates a lax coercer.
    #[must_use]
    pub fn new(decoders: &'a DecoderTable, fallback: &'a dyn DefaultDeserializer) -> Self {
        Self {
            decoders,
            fallback,
            mode: CoercionMode::Lax,
        }
    }

    /// Returns a copy using `mode`.
    #[must_use]
    pub fn with_mode(self, mode: CoercionMode) -> Self {
        Self { mode, ..self }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> CoercionMode {
        self.mode
    }

    /// Coerces `value` into `ty`.
    pub fn coerce(&self, ty: &FieldType, value: Value) -> CoercionResult {
        match ty {
            FieldType::Any => Ok(value),
            FieldType::None => self.to_null(value).map_err(single),
            FieldType::Bool => self.to_bool(value).map_err(single),
            FieldType::Int => self.to_int(value).map_err(single),
            FieldType::Float => self.to_float(value).map_err(single),
            FieldType::Str => match value {
                Value::Str(_) => Ok(value),
                other => Err(single(CoercionFailure::unexpected("str", &other))),
            },
            FieldType::Bytes => to_bytes(value).map_err(single),
            FieldType::List(inner) => self.coerce_list(inner, value),
            FieldType::Map(inner) => self.coerce_map(inner, value),
            FieldType::Object(object) => self.coerce_object(object, value),
            FieldType::Optional(inner) => self.coerce_optional(inner, value),
            FieldType::Union(members) => self.coerce_union(ty, members, value),
            FieldType::Named(name) => self.decode(name, value),
            FieldType::Constrained(inner, meta) => {
                let value = self.coerce(inner, value)?;
                check_constraints(meta, &value).map_err(single)?;
                Ok(value)
            }
        }
    }

    fn to_null(&self, value: Value) -> Result<Value, CoercionFailure> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Str(s) if self.mode == CoercionMode::Lax && s.eq_ignore_ascii_case("null") => {
                Ok(Value::Null)
            }
            other => Err(CoercionFailure::unexpected("null", &other)),
        }
    }

    fn to_bool(&self, value: Value) -> Result<Value, CoercionFailure> {
        let lax = self.mode == CoercionMode::Lax;
        match value {
            Value::Bool(_) => Ok(value),
            Value::Int(i @ (0 | 1)) if lax => Ok(Value::Bool(i == 1)),
            Value::Str(ref s) if lax => {
                if s.eq_ignore_ascii_case("true") || s == "1" {
                    Ok(Value::Bool(true))
                } else if s.eq_ignore_ascii_case("false") || s == "0" {
                    Ok(Value::Bool(false))
                } else {
                    Err(CoercionFailure::unexpected("bool", &value))
                }
            }
            other => Err(CoercionFailure::unexpected("bool", &other)),
        }
    }

    fn to_int(&self, value: Value) -> Result<Value, CoercionFailure> {
        let lax = self.mode == CoercionMode::Lax;
        match value {
            Value::Int(_) => Ok(value),
            Value::Float(x) if lax => integral(x)
                .map(Value::Int)
                .ok_or_else(|| CoercionFailure::unexpected("int", &value)),
            Value::Str(ref s) if lax => s
                .parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
                .map(Value::Int)
                .ok_or_else(|| CoercionFailure::unexpected("int", &value)),
            other => Err(CoercionFailure::unexpected("int", &other)),
        }
    }

    fn to_float(&self, value: Value) -> Result<Value, CoercionFailure> {
        match value {
            Value::Float(_) => Ok(value),
            Value::Int(i) => Ok(Value::Float(i as f64)),
            Value::Str(ref s) if self.mode == CoercionMode::Lax => s
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| CoercionFailure::unexpected("float", &value)),
            other => Err(CoercionFailure::unexpected("float", &other)),
        }
    }

    fn coerce_list(&self, inner: &FieldType, value: Value) -> CoercionResult {
        let items = match value {
            Value::List(items) => items,
            other => return Err(single(CoercionFailure::unexpected("array", &other))),
        };
        let mut out = Vec::with_capacity(items.len());
        let mut failures = Vec::new();
        for (idx, item) in items.into_iter().enumerate() {
            match self.coerce(inner, item) {
                Ok(item) => out.push(item),
                Err(errs) => failures.extend(nest(errs, &PathSegment::Index(idx))),
            }
        }
        finish(Value::List(out), failures)
    }

    fn coerce_map(&self, inner: &FieldType, value: Value) -> CoercionResult {
        let entries = match value {
            Value::Map(entries) => entries,
            other => return Err(single(CoercionFailure::unexpected("object", &other))),
        };
        let mut out = IndexMap::with_capacity(entries.len());
        let mut failures = Vec::new();
        for (key, item) in entries {
            match self.coerce(inner, item) {
                Ok(item) => {
                    out.insert(key, item);
                }
                Err(errs) => failures.extend(nest(errs, &PathSegment::Key(key))),
            }
        }
        finish(Value::Map(out), failures)
    }

    fn coerce_object(&self, object: &ObjectType, value: Value) -> CoercionResult {
        let mut entries = match value {
            Value::Map(entries) => entries,
            other => return Err(single(CoercionFailure::unexpected("object", &other))),
        };
        let mut out = IndexMap::with_capacity(object.fields.len());
        let mut failures = Vec::new();
        for field in &object.fields {
            match entries.shift_remove(&field.name) {
                Some(raw) => match self.coerce(&field.field_type, raw) {
                    Ok(coerced) => {
                        out.insert(field.name.clone(), coerced);
                    }
                    Err(errs) => {
                        failures.extend(nest(errs, &PathSegment::Key(field.name.clone())));
                    }
                },
                None if field.required => failures.push(CoercionFailure::new(format!(
                    "Object missing required field `{}`",
                    field.name
                ))),
                None => {}
            }
        }
        finish(Value::Map(out), failures)
    }

    fn coerce_optional(&self, inner: &FieldType, value: Value) -> CoercionResult {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self.coerce(inner, value.clone()) {
            Ok(coerced) => Ok(coerced),
            Err(failures) => self.to_null(value).map_err(|_| failures),
        }
    }

    fn coerce_union(&self, ty: &FieldType, members: &[FieldType], value: Value) -> CoercionResult {
        let strict = self.with_mode(CoercionMode::Strict);
        if let Some(coerced) = members
            .iter()
            .find_map(|member| strict.coerce(member, value.clone()).ok())
        {
            return Ok(coerced);
        }

        let mut last = Vec::new();
        if self.mode == CoercionMode::Lax {
            for member in members {
                match self.coerce(member, value.clone()) {
                    Ok(coerced) => return Ok(coerced),
                    Err(failures) => last = failures,
                }
            }
        } else if let [member] = members {
            return strict.coerce(member, value);
        }

        if members.len() == 1 {
            Err(last)
        } else {
            Err(single(CoercionFailure::unexpected(ty, &value)))
        }
    }

    fn decode(&self, name: &TypeName, value: Value) -> CoercionResult {
        if value.is_instance_of(name) {
            return Ok(value);
        }
        let decoded = match self.decoders.get(name) {
            Some(decoder) => decoder(name, value),
            None => self.fallback.deserialize(name, value),
        };
        decoded.map_err(|err| single(CoercionFailure::from_decode_error(&err)))
    }
}

impl fmt::Debug for Coercer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coercer")
            .field("decoders", &self.decoders.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn single(failure: CoercionFailure) -> Vec<CoercionFailure> {
    vec![failure]
}

fn nest(
    failures: Vec<CoercionFailure>,
    segment: &PathSegment,
) -> impl Iterator<Item = CoercionFailure> + '_ {
    failures
        .into_iter()
        .map(move |failure| failure.within(segment.clone()))
}

fn finish(value: Value, failures: Vec<CoercionFailure>) -> CoercionResult {
    if failures.is_empty() {
        Ok(value)
    } else {
        Err(failures)
    }
}

fn integral(x: f64) -> Option<i64> {
    let in_range = x >= i64::MIN as f64 && x < i64::MAX as f64;
    (x.fract() == 0.0 && in_range).then_some(x as i64)
}

fn to_bytes(value: Value) -> Result<Value, CoercionFailure> {
    match value {
        Value::Bytes(_) => Ok(value),
        Value::Str(s) => STANDARD
            .decode(s.as_bytes())
            .map(Value::Bytes)
            .map_err(|_| CoercionFailure::new("Invalid base64 encoded string")),
        other => Err(CoercionFailure::unexpected("bytes", &other)),
    }
}

/// Checks `value` against `meta`, reporting the first violated constraint.
///
/// Constraints that do not apply to the value's kind are ignored.
pub fn check_constraints(meta: &Meta, value: &Value) -> Result<(), CoercionFailure> {
    match value {
        Value::Int(i) => check_number(meta, "int", *i as f64, Some(*i)),
        Value::Float(x) => check_number(meta, "float", *x, None),
        Value::Str(s) => {
            check_length(meta, "str", s.chars().count())?;
            match &meta.pattern {
                Some(pattern) if !pattern.is_match(s) => Err(CoercionFailure::new(format!(
                    "Expected `str` matching regex '{pattern}'"
                ))),
                _ => Ok(()),
            }
        }
        Value::Bytes(b) => check_length(meta, "bytes", b.len()),
        Value::List(items) => check_length(meta, "array", items.len()),
        Value::Map(entries) => check_length(meta, "object", entries.len()),
        _ => Ok(()),
    }
}

fn check_number(meta: &Meta, kind: &str, x: f64, int: Option<i64>) -> Result<(), CoercionFailure> {
    let bounds: [(Option<f64>, &str, fn(Ordering) -> bool); 4] = [
        (meta.gt, ">", Ordering::is_gt),
        (meta.ge, ">=", Ordering::is_ge),
        (meta.lt, "<", Ordering::is_lt),
        (meta.le, "<=", Ordering::is_le),
    ];
    for (bound, op, holds) in bounds {
        if let Some(bound) = bound {
            if !compare(x, int, bound).is_some_and(holds) {
                return Err(CoercionFailure::new(format!(
                    "Expected `{kind}` {op} {}",
                    format_bound(kind, bound)
                )));
            }
        }
    }

    if let Some(factor) = meta.multiple_of {
        let is_multiple = match (int, integral(factor)) {
            (Some(i), Some(f)) if f != 0 => i.wrapping_rem(f) == 0,
            _ => factor != 0.0 && x % factor == 0.0,
        };
        if !is_multiple {
            return Err(CoercionFailure::new(format!(
                "Expected `{kind}` that's a multiple of {}",
                format_bound(kind, factor)
            )));
        }
    }
    Ok(())
}

/// Integers are compared exactly against integral bounds.
fn compare(x: f64, int: Option<i64>, bound: f64) -> Option<Ordering> {
    match (int, integral(bound)) {
        (Some(i), Some(b)) => Some(i.cmp(&b)),
        _ => x.partial_cmp(&bound),
    }
}

fn check_length(meta: &Meta, kind: &str, len: usize) -> Result<(), CoercionFailure> {
    if let Some(min) = meta.min_length {
        if len < min {
            return Err(CoercionFailure::new(format!(
                "Expected `{kind}` of length >= {min}"
            )));
        }
    }
    if let Some(max) = meta.max_length {
        if len > max {
            return Err(CoercionFailure::new(format!(
                "Expected `{kind}` of length <= {max}"
            )));
        }
    }
    Ok(())
}

fn format_bound(kind: &str, bound: f64) -> String {
    match integral(bound) {
        Some(i) if kind == "int" => i.to_string(),
        Some(_) => format!("{bound:.1}"),
        None => bound.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::ObjectField;
    use crate::constraints::Pattern;
    use crate::decoders::{RejectUnknownTypes, TypeDecoders};
    use std::sync::Arc;

    fn lax(ty: &FieldType, value: Value) -> CoercionResult {
        let table = DecoderTable::new();
        Coercer::new(&table, &RejectUnknownTypes).coerce(ty, value)
    }

    fn message(result: CoercionResult) -> String {
        let failures = result.unwrap_err();
        assert_eq!(failures.len(), 1, "{failures:?}");
        failures[0].to_string()
    }

    fn constrained(inner: FieldType, meta: Meta) -> FieldType {
        FieldType::Constrained(Box::new(inner), Arc::new(meta))
    }

    #[test]
    fn test_lax_scalar_conversions() {
        assert_eq!(lax(&FieldType::Int, Value::from("5")).unwrap(), Value::Int(5));
        assert_eq!(lax(&FieldType::Int, Value::Float(3.0)).unwrap(), Value::Int(3));
        assert_eq!(lax(&FieldType::Float, Value::from("0.5")).unwrap(), Value::Float(0.5));
        assert_eq!(lax(&FieldType::Float, Value::Int(2)).unwrap(), Value::Float(2.0));
        assert_eq!(lax(&FieldType::Bool, Value::from("TRUE")).unwrap(), Value::Bool(true));
        assert_eq!(lax(&FieldType::Bool, Value::from("0")).unwrap(), Value::Bool(false));
        assert_eq!(lax(&FieldType::Bool, Value::Int(1)).unwrap(), Value::Bool(true));
        assert_eq!(lax(&FieldType::None, Value::from("null")).unwrap(), Value::Null);
    }

    #[test]
    fn test_strict_rejects_strings() {
        let table = DecoderTable::new();
        let strict = Coercer::new(&table, &RejectUnknownTypes).with_mode(CoercionMode::Strict);
        assert!(strict.coerce(&FieldType::Int, Value::from("5")).is_err());
        assert!(strict.coerce(&FieldType::Bool, Value::Int(1)).is_err());
        assert_eq!(
            strict.coerce(&FieldType::Float, Value::Int(1)).unwrap(),
            Value::Float(1.0)
        );
    }

    #[test]
    fn test_type_mismatch_message() {
        assert_eq!(
            message(lax(&FieldType::Int, Value::from("abc"))),
            "Expected `int`, got `str`"
        );
        assert_eq!(
            message(lax(&FieldType::Str, Value::Int(1))),
            "Expected `str`, got `int`"
        );
        assert_eq!(
            message(lax(&FieldType::Int, Value::Float(1.5))),
            "Expected `int`, got `float`"
        );
    }

    #[test]
    fn test_bytes_from_base64() {
        assert_eq!(
            lax(&FieldType::Bytes, Value::from("aGk=")).unwrap(),
            Value::Bytes(b"hi".to_vec())
        );
        assert_eq!(
            message(lax(&FieldType::Bytes, Value::from("***"))),
            "Invalid base64 encoded string"
        );
    }

    #[test]
    fn test_list_failures_carry_index() {
        let ty = FieldType::List(Box::new(FieldType::Int));
        let failures = lax(&ty, Value::from(vec!["1", "x", "3", "y"])).unwrap_err();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].keys(), ["1"]);
        assert_eq!(failures[1].to_string(), "Expected `int`, got `str` - at `$[3]`");
    }

    #[test]
    fn test_object_coercion() {
        let ty = FieldType::Object(ObjectType {
            name: "Item".to_string(),
            fields: vec![
                ObjectField {
                    name: "id".to_string(),
                    field_type: FieldType::Int,
                    required: true,
                },
                ObjectField {
                    name: "tags".to_string(),
                    field_type: FieldType::List(Box::new(FieldType::Str)),
                    required: false,
                },
            ],
        });

        let ok = lax(&ty, Value::from(serde_json::json!({"id": 1, "extra": true}))).unwrap();
        let Value::Map(map) = ok else {
            panic!("expected map");
        };
        assert_eq!(map.len(), 1);
        assert_eq!(map["id"], Value::Int(1));

        let failures = lax(&ty, Value::from(serde_json::json!({"tags": ["a", 2]}))).unwrap_err();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].message, "Object missing required field `id`");
        assert!(failures[0].path.is_empty());
        assert_eq!(failures[1].message, "Expected `str`, got `int`");
        assert_eq!(failures[1].keys(), ["tags", "1"]);
    }

    #[test]
    fn test_optional_accepts_null() {
        let ty = FieldType::Optional(Box::new(FieldType::Int));
        assert_eq!(lax(&ty, Value::Null).unwrap(), Value::Null);
        assert_eq!(lax(&ty, Value::from("7")).unwrap(), Value::Int(7));
        assert_eq!(message(lax(&ty, Value::from("x"))), "Expected `int`, got `str`");
    }

    #[test]
    fn test_union_prefers_exact_match() {
        let ty = FieldType::Union(vec![FieldType::Int, FieldType::Str]);
        assert_eq!(lax(&ty, Value::from("5")).unwrap(), Value::from("5"));
        assert_eq!(lax(&ty, Value::Int(5)).unwrap(), Value::Int(5));
        assert_eq!(
            message(lax(&ty, Value::Bool(true))),
            "Expected `int | str`, got `bool`"
        );
    }

    #[test]
    fn test_single_member_union_reports_member_failure() {
        let ty = FieldType::Union(vec![constrained(
            FieldType::Int,
            Meta {
                ge: Some(1.0),
                ..Meta::default()
            },
        )]);
        assert_eq!(lax(&ty, Value::from("3")).unwrap(), Value::Int(3));
        assert_eq!(message(lax(&ty, Value::from("0"))), "Expected `int` >= 1");
    }

    #[test]
    fn test_numeric_constraints() {
        let ty = constrained(
            FieldType::Int,
            Meta {
                gt: Some(0.0),
                le: Some(100.0),
                multiple_of: Some(5.0),
                ..Meta::default()
            },
        );
        assert!(lax(&ty, Value::Int(25)).is_ok());
        assert_eq!(message(lax(&ty, Value::Int(0))), "Expected `int` > 0");
        assert_eq!(message(lax(&ty, Value::Int(105))), "Expected `int` <= 100");
        assert_eq!(
            message(lax(&ty, Value::Int(7))),
            "Expected `int` that's a multiple of 5"
        );

        let float = constrained(
            FieldType::Float,
            Meta {
                lt: Some(1.0),
                ..Meta::default()
            },
        );
        assert_eq!(message(lax(&float, Value::Float(1.5))), "Expected `float` < 1.0");
    }

    #[test]
    fn test_large_int_bounds_compare_exactly() {
        let limit = 1_i64 << 53;
        let ty = constrained(
            FieldType::Int,
            Meta {
                le: Some(limit as f64),
                ..Meta::default()
            },
        );
        assert!(lax(&ty, Value::Int(limit)).is_ok());
        assert!(lax(&ty, Value::Int(limit + 1)).is_err());

        let ty = constrained(
            FieldType::Int,
            Meta {
                gt: Some(limit as f64),
                ..Meta::default()
            },
        );
        assert!(lax(&ty, Value::Int(limit)).is_err());
        assert!(lax(&ty, Value::Int(limit + 1)).is_ok());
    }

    #[test]
    fn test_string_constraints() {
        let ty = constrained(
            FieldType::Str,
            Meta {
                min_length: Some(2),
                max_length: Some(4),
                pattern: Pattern::new("^[a-z]+$").ok(),
                ..Meta::default()
            },
        );
        assert!(lax(&ty, Value::from("abc")).is_ok());
        assert_eq!(
            message(lax(&ty, Value::from("a"))),
            "Expected `str` of length >= 2"
        );
        assert_eq!(
            message(lax(&ty, Value::from("abcde"))),
            "Expected `str` of length <= 4"
        );
        assert_eq!(
            message(lax(&ty, Value::from("AB"))),
            "Expected `str` matching regex '^[a-z]+$'"
        );
    }

    #[test]
    fn test_collection_length_constraints() {
        let ty = constrained(
            FieldType::List(Box::new(FieldType::Int)),
            Meta {
                min_length: Some(1),
                ..Meta::default()
            },
        );
        assert_eq!(
            message(lax(&ty, Value::List(vec![]))),
            "Expected `array` of length >= 1"
        );
    }

    #[test]
    fn test_named_types_use_decoder_table() {
        let mut table = DecoderTable::new();
        let path = TypeName::new("path");
        table.insert(path.clone(), TypeDecoders::defaults().find(&path).unwrap());
        let coercer = Coercer::new(&table, &RejectUnknownTypes);

        let ty = FieldType::Named(path);
        let decoded = coercer.coerce(&ty, Value::from("/etc/hosts")).unwrap();
        assert_eq!(decoded.kind(), "path");
        assert_eq!(coercer.coerce(&ty, decoded.clone()).unwrap(), decoded);

        let unknown = FieldType::Named(TypeName::new("Money"));
        let failures = coercer.coerce(&unknown, Value::from("1")).unwrap_err();
        assert_eq!(failures[0].message, "Unsupported type: `Money`");
    }

    #[test]
    fn test_decode_error_with_nested_path() {
        let err = DecodeError::new("Expected `int`, got `str` - at `$.items[0]`");
        let failure = CoercionFailure::from_decode_error(&err);
        assert_eq!(failure.message, "Expected `int`, got `str`");
        assert_eq!(failure.keys(), ["items[0]"]);

        let plain = CoercionFailure::from_decode_error(&DecodeError::new("Invalid UUID"));
        assert!(plain.path.is_empty());
    }
}
