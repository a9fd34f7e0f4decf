//! Collect-then-validate flow over real request connections.

use http::{Method, Uri};
use meridian_core::{MeridianError, ParamSource};
use meridian_extract::{collect_kwargs, ExtractionError, RequestConnection};
use meridian_signature::{
    BodyKwarg, DependencyNames, Kwargs, ObjectAnnotation, ParameterKwarg, ParameterSpec,
    ParsedSignature, SignatureModel, TypeAnnotation, TypeDecoders, Value,
};
use proptest::prelude::*;

fn search_model() -> SignatureModel {
    let signature = ParsedSignature::new()
        .param(ParameterSpec::new("limit", TypeAnnotation::Int).with_default(20_i64))
        .param(ParameterSpec::new(
            "tags",
            TypeAnnotation::optional(TypeAnnotation::list(TypeAnnotation::Str)),
        ))
        .param(
            ParameterSpec::new("api_key", TypeAnnotation::Str)
                .with_kwarg(ParameterKwarg::header("x-api-key").min_length(4)),
        )
        .param(ParameterSpec::new("db", TypeAnnotation::Any));
    let dependencies: DependencyNames = ["db".to_string()].into_iter().collect();
    SignatureModel::create(
        "search",
        &dependencies,
        false,
        &signature,
        &TypeDecoders::defaults(),
    )
    .unwrap()
}

fn validate(model: &SignatureModel, conn: &RequestConnection) -> Result<Kwargs, MeridianError> {
    let mut kwargs = collect_kwargs(conn, model)
        .map_err(|e| e.into_validation_error("GET", meridian_signature::Connection::url(conn)))?;
    kwargs.insert("db".to_string(), Value::from("pool"));
    model.parse_values_from_connection_kwargs(conn, kwargs)
}

#[test]
fn test_valid_request() {
    let model = search_model();
    let conn = RequestConnection::builder()
        .uri(Uri::from_static("/search?limit=5&tags=a&tags=b"))
        .header("x-api-key", "secret")
        .build()
        .unwrap();

    let values = validate(&model, &conn).unwrap();
    assert_eq!(values["limit"], Value::Int(5));
    assert_eq!(values["tags"], Value::from(vec!["a", "b"]));
    assert_eq!(values["api_key"], Value::from("secret"));
    assert_eq!(values["db"], Value::from("pool"));
}

#[test]
fn test_defaults_fill_missing_query_values() {
    let model = search_model();
    let conn = RequestConnection::builder()
        .uri(Uri::from_static("/search"))
        .header("x-api-key", "secret")
        .build()
        .unwrap();

    let values = validate(&model, &conn).unwrap();
    assert_eq!(values["limit"], Value::Int(20));
}

#[test]
fn test_errors_carry_their_source() {
    let model = search_model();
    let conn = RequestConnection::builder()
        .uri(Uri::from_static("/search?limit=many"))
        .header("x-api-key", "abc")
        .build()
        .unwrap();

    let err = validate(&model, &conn).unwrap_err();
    assert_eq!(err.to_string(), "Validation failed for GET /search?limit=many");

    let messages = err.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].key.as_deref(), Some("limit"));
    assert_eq!(messages[0].source, Some(ParamSource::Query));
    assert_eq!(messages[1].key.as_deref(), Some("api_key"));
    assert_eq!(messages[1].source, Some(ParamSource::Header));
    assert_eq!(messages[1].message, "Expected `str` of length >= 4");
}

#[test]
fn test_body_errors_point_into_the_body() {
    let item = ObjectAnnotation::new("Item")
        .required("name", TypeAnnotation::Str)
        .required("price", TypeAnnotation::Float);
    let signature = ParsedSignature::new().param(
        ParameterSpec::new("data", TypeAnnotation::Object(item)).with_kwarg(BodyKwarg::default()),
    );
    let model = SignatureModel::create(
        "create_item",
        &DependencyNames::new(),
        false,
        &signature,
        &TypeDecoders::defaults(),
    )
    .unwrap();
    let conn = RequestConnection::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/items"))
        .header("content-type", "application/json")
        .body(r#"{"name": "lamp", "price": "cheap"}"#)
        .build()
        .unwrap();

    let raw = collect_kwargs(&conn, &model).unwrap();
    let err = model
        .parse_values_from_connection_kwargs(&conn, raw)
        .unwrap_err();

    assert_eq!(err.to_string(), "Validation failed for POST /items");
    let messages = err.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].key.as_deref(), Some("price"));
    assert_eq!(messages[0].source, Some(ParamSource::Body));
}

#[test]
fn test_unreadable_request_is_a_validation_error() {
    let err = ExtractionError::malformed(ParamSource::Query, "bad escape")
        .into_validation_error("GET", "/search?%zz");
    assert!(matches!(err, MeridianError::Validation { .. }));
    assert_eq!(err.messages()[0].source, Some(ParamSource::Query));
}

#[test]
fn test_websocket_failures_name_websocket() {
    let signature = ParsedSignature::new().param(ParameterSpec::new("room", TypeAnnotation::Int));
    let model = SignatureModel::create(
        "chat",
        &DependencyNames::new(),
        false,
        &signature,
        &TypeDecoders::defaults(),
    )
    .unwrap();
    let conn = RequestConnection::builder()
        .websocket()
        .uri(Uri::from_static("/ws?room=lobby"))
        .build()
        .unwrap();

    let raw = collect_kwargs(&conn, &model).unwrap();
    let err = model
        .parse_values_from_connection_kwargs(&conn, raw)
        .unwrap_err();
    assert_eq!(err.to_string(), "Validation failed for websocket /ws?room=lobby");
}

proptest! {
    #[test]
    fn prop_integer_query_values_validate(limit in any::<i32>()) {
        let model = search_model();
        let uri: Uri = format!("/search?limit={limit}").parse().unwrap();
        let conn = RequestConnection::builder()
            .uri(uri)
            .header("x-api-key", "secret")
            .build()
            .unwrap();

        let values = validate(&model, &conn).unwrap();
        prop_assert_eq!(&values["limit"], &Value::Int(i64::from(limit)));
    }
}
