//! # Meridian
//!
//! **Request-signature validation for HTTP handlers**
//!
//! Meridian turns a handler's declared parameters into a signature model at
//! startup, then validates and coerces every request's raw values against
//! it:
//!
//! - Typed coercion of query, header, cookie, path and body values
//! - Declarative constraints (`ge`, `max_length`, `pattern`, ...)
//! - Pluggable decoders for nominal types (UUIDs, dates, your own)
//! - Client-facing errors that name the offending key and where it came from
//! - Failing injected dependencies reported as internal errors, never leaked
//!
//! ## Quick Start
//!
//! ```rust
//! use meridian::prelude::*;
//! use http::Uri;
//!
//! let signature = ParsedSignature::new()
//!     .param(ParameterSpec::new("limit", TypeAnnotation::Int).with_default(20_i64))
//!     .param(
//!         ParameterSpec::new("token", TypeAnnotation::Str)
//!             .with_kwarg(ParameterKwarg::header("x-token")),
//!     );
//!
//! let app = App::builder()
//!     .config(MeridianConfig::development())
//!     .handler("list_items", "list_items", DependencyNames::new(), false, signature)
//!     .build()
//!     .unwrap();
//!
//! let conn = RequestConnection::builder()
//!     .uri(Uri::from_static("/items?limit=oops"))
//!     .build()
//!     .unwrap();
//!
//! let err = app.validate_request("list_items", &conn, Kwargs::new()).unwrap_err();
//! assert_eq!(err.to_string(), "Validation failed for GET /items?limit=oops");
//! assert_eq!(err.messages().len(), 2);
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`core`] | Errors, error messages, request ids |
//! | [`signature`] | Type normalization, constraints, coercion, signature models |
//! | [`extract`] | Request connections and raw kwarg collection |
//! | [`config`] | Typed, layered configuration |
//! | [`telemetry`] | Log subscriber setup |

#![doc(html_root_url = "https://docs.rs/meridian/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;

pub use app::{App, AppBuilder};

// Re-export member crates
pub use meridian_config as config;
pub use meridian_core as core;
pub use meridian_extract as extract;
pub use meridian_signature as signature;
pub use meridian_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use meridian::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{App, AppBuilder};

    pub use meridian_core::{ErrorMessage, MeridianError, MeridianResult, ParamSource, RequestId};

    pub use meridian_signature::{
        BodyKwarg, Connection, DecodeError, DependencyKwarg, DependencyNames, Kwargs,
        MockConnection, ObjectAnnotation, ParameterKwarg, ParameterSpec, ParsedSignature,
        SignatureModel, TypeAnnotation, TypeDecoders, TypeName, Value,
    };

    pub use meridian_extract::{collect_kwargs, RequestConnection};

    pub use meridian_config::{ConfigLoader, MeridianConfig};
}
