//! # Meridian Extract
//!
//! Reads the raw values a handler's signature model validates.
//!
//! A [`RequestConnection`] wraps the parts of one HTTP (or websocket)
//! request: method, URL, headers, cookies, query string, router path
//! parameters and the already-read body. It implements
//! [`meridian_signature::Connection`], so it is what signature models see
//! when they build error messages.
//!
//! [`collect_kwargs`] walks a model's fields and picks each raw value from
//! the right place:
//!
//! | Field | Source |
//! |-------|--------|
//! | `data` | JSON request body |
//! | `headers`, `cookies`, `query` | the whole mapping |
//! | `header=` parameter | the named header |
//! | `cookie=` parameter | the named cookie |
//! | path parameter of the same name | router capture |
//! | anything else | query string, by alias or name |
//!
//! Values stay untyped; coercion happens in
//! [`SignatureModel::parse_values_from_connection_kwargs`](meridian_signature::SignatureModel::parse_values_from_connection_kwargs).
//!
//! ## Example
//!
//! ```rust
//! use meridian_extract::{collect_kwargs, RequestConnection};
//! use meridian_signature::{
//!     DependencyNames, ParameterSpec, ParsedSignature, SignatureModel, TypeAnnotation,
//!     TypeDecoders, Value,
//! };
//! use http::Uri;
//!
//! let signature = ParsedSignature::new()
//!     .param(ParameterSpec::new("limit", TypeAnnotation::Int));
//! let model = SignatureModel::create(
//!     "list_items",
//!     &DependencyNames::new(),
//!     false,
//!     &signature,
//!     &TypeDecoders::defaults(),
//! )
//! .unwrap();
//!
//! let conn = RequestConnection::builder()
//!     .uri(Uri::from_static("/items?limit=10"))
//!     .build()
//!     .unwrap();
//!
//! let raw = collect_kwargs(&conn, &model).unwrap();
//! let parsed = model.parse_values_from_connection_kwargs(&conn, raw).unwrap();
//! assert_eq!(parsed["limit"], Value::Int(10));
//! ```
//!
//! ## Errors
//!
//! Reading fails with [`ExtractionError`] when the request itself is
//! unreadable (bad percent-encoding, non UTF-8 headers, a body that is not
//! JSON). Convert it with [`ExtractionError::into_validation_error`].

#![doc(html_root_url = "https://docs.rs/meridian-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod collect;
mod context;
mod cookie;
mod error;
mod query;

pub use collect::collect_kwargs;
pub use context::{RequestConnection, RequestConnectionBuilder, REQUEST_ID_HEADER};
pub use cookie::Cookies;
pub use error::ExtractionError;
pub use query::QueryParams;
