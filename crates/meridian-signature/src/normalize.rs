//! Annotation normalization.
//!
//! Turns a declared [`TypeAnnotation`] into the [`FieldType`] the coercion
//! engine walks: `None` members are folded into an optional wrapper,
//! constraint metadata is attached to every non-`None` member, and nominal
//! types get their decoder recorded in the model's side table.

use crate::annotation::{FieldType, ObjectField, ObjectType, TypeAnnotation, TypeName};
use crate::constraints::{KwargDefinition, Meta};
use crate::decoders::{TypeDecoderFn, TypeDecoders};
use crate::parameter::{ParameterSpec, SKIP_VALIDATION_NAMES};
use std::collections::HashMap;
use std::sync::Arc;

/// Handler-local mapping from nominal type to its decoder.
pub type DecoderTable = HashMap<TypeName, TypeDecoderFn>;

/// Normalizes the annotation of one handler parameter.
///
/// `data` on a handler with a body DTO, the skip-validation names, and
/// dependencies declared with `skip_validation` all become [`FieldType::Any`].
pub fn create_annotation(
    parameter: &ParameterSpec,
    has_data_dto: bool,
    decoders: &TypeDecoders,
    table: &mut DecoderTable,
    meta: Option<&Arc<Meta>>,
) -> FieldType {
    if parameter.name == "data" && has_data_dto {
        return FieldType::Any;
    }
    if skips_validation(parameter) {
        return FieldType::Any;
    }
    normalize(&parameter.annotation, decoders, table, meta)
}

fn skips_validation(parameter: &ParameterSpec) -> bool {
    SKIP_VALIDATION_NAMES.contains(&parameter.name.as_str())
        || matches!(
            &parameter.kwarg_definition,
            Some(KwargDefinition::Dependency(dependency)) if dependency.skip_validation
        )
}

/// Normalizes an annotation, attaching `meta` to every non-`None` member.
pub fn normalize(
    annotation: &TypeAnnotation,
    decoders: &TypeDecoders,
    table: &mut DecoderTable,
    meta: Option<&Arc<Meta>>,
) -> FieldType {
    let base = match annotation {
        TypeAnnotation::Any => return FieldType::Any,
        TypeAnnotation::Union(members) => return normalize_union(members, decoders, table, meta),
        TypeAnnotation::None => return FieldType::None,
        TypeAnnotation::Bool => FieldType::Bool,
        TypeAnnotation::Int => FieldType::Int,
        TypeAnnotation::Float => FieldType::Float,
        TypeAnnotation::Str => FieldType::Str,
        TypeAnnotation::Bytes => FieldType::Bytes,
        TypeAnnotation::List(inner) => {
            FieldType::List(Box::new(normalize(inner, decoders, table, None)))
        }
        TypeAnnotation::Map(inner) => {
            FieldType::Map(Box::new(normalize(inner, decoders, table, None)))
        }
        TypeAnnotation::Object(object) => FieldType::Object(ObjectType {
            name: object.name.clone(),
            fields: object
                .properties
                .iter()
                .map(|property| ObjectField {
                    name: property.name.clone(),
                    field_type: normalize(&property.annotation, decoders, table, None),
                    required: property.required,
                })
                .collect(),
        }),
        TypeAnnotation::Named(name) => {
            if !table.contains_key(name) {
                if let Some(decoder) = decoders.find(name) {
                    table.insert(name.clone(), decoder);
                }
            }
            FieldType::Named(name.clone())
        }
    };

    match meta {
        Some(meta) => FieldType::Constrained(Box::new(base), Arc::clone(meta)),
        None => base,
    }
}

fn normalize_union(
    members: &[TypeAnnotation],
    decoders: &TypeDecoders,
    table: &mut DecoderTable,
    meta: Option<&Arc<Meta>>,
) -> FieldType {
    let optional = members.iter().any(|m| matches!(m, TypeAnnotation::None));
    let mut types: Vec<FieldType> = members
        .iter()
        .filter(|m| !matches!(m, TypeAnnotation::None))
        .map(|m| normalize(m, decoders, table, meta))
        .collect();

    if !optional {
        return FieldType::Union(types);
    }
    match types.len() {
        0 => FieldType::None,
        1 => FieldType::Optional(Box::new(types.remove(0))),
        _ => FieldType::Optional(Box::new(FieldType::Union(types))),
    }
}
