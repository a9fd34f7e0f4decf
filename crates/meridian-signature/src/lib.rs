//! # Meridian Signature
//!
//! Handler signature models for the Meridian framework.
//!
//! At startup every handler's parsed signature is turned into a
//! [`SignatureModel`]: a list of typed, constrained field descriptors plus a
//! handler-local decoder table. At request time the model coerces the raw
//! values collected from query strings, headers, cookies and the body, and
//! translates failures into source-attributed [`ErrorMessage`]s.
//!
//! | Stage | Item | Runs |
//! |-------|------|------|
//! | Constraint translation | [`translate`] | once per parameter |
//! | Type normalization | [`normalize`](normalize::normalize) | once per parameter |
//! | Model build | [`SignatureModel::create`] | once per handler |
//! | Coercion | [`SignatureModel::parse_values_from_connection_kwargs`] | per request |
//! | Error projection | [`SignatureModel::build_error_message`], [`SignatureModel::create_exception`] | per failed request |
//!
//! ## Example
//!
//! ```rust
//! use meridian_core::{MeridianError, ParamSource};
//! use meridian_signature::{
//!     DependencyNames, Kwargs, MockConnection, ParameterKwarg, ParameterSpec,
//!     ParsedSignature, SignatureModel, TypeAnnotation, TypeDecoders, Value,
//! };
//!
//! let signature = ParsedSignature::new()
//!     .param(ParameterSpec::new("id", TypeAnnotation::Int))
//!     .param(
//!         ParameterSpec::new("session", TypeAnnotation::Str)
//!             .with_kwarg(ParameterKwarg::cookie("sid").min_length(8)),
//!     );
//!
//! let model = SignatureModel::create(
//!     "get_user",
//!     &DependencyNames::new(),
//!     false,
//!     &signature,
//!     &TypeDecoders::defaults(),
//! )?;
//!
//! let mut raw = Kwargs::new();
//! raw.insert("id".into(), Value::from("abc"));
//! raw.insert("session".into(), Value::from("short"));
//!
//! let conn = MockConnection::get("/users?id=abc").with_query_param("id");
//! let err = model.parse_values_from_connection_kwargs(&conn, raw).unwrap_err();
//!
//! assert!(matches!(err, MeridianError::Validation { .. }));
//! let sources: Vec<_> = err.messages().iter().map(|m| m.source).collect();
//! assert_eq!(sources, [Some(ParamSource::Query), Some(ParamSource::Cookie)]);
//! # Ok::<(), MeridianError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/meridian-signature/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod annotation;
pub mod coerce;
mod connection;
pub mod constraints;
pub mod decoders;
mod model;
pub mod normalize;
mod parameter;
mod registry;
mod value;

pub use annotation::{
    names, FieldType, ObjectAnnotation, ObjectField, ObjectType, PropertyAnnotation,
    TypeAnnotation, TypeName,
};
pub use coerce::{Coercer, CoercionFailure, CoercionMode, PathSegment};
pub use connection::{Connection, MockConnection};
pub use constraints::{
    translate, BodyKwarg, Constraints, DependencyKwarg, Documentation, KwargDefinition, Meta,
    ParameterKwarg, Pattern,
};
pub use decoders::{
    DecodeError, DefaultDeserializer, RejectUnknownTypes, TypeDecoderFn, TypeDecoders,
    TypePredicate,
};
pub use model::{resolve_handler_name, SignatureField, SignatureModel, ANONYMOUS};
pub use parameter::{
    DependencyNames, ParamDefault, ParameterSpec, ParsedSignature, RESERVED_KWARGS,
    SKIP_VALIDATION_NAMES,
};
pub use registry::{HandlerId, SignatureRegistry};
pub use value::{CustomValue, Kwargs, Value};
pub use meridian_core::ErrorMessage;
