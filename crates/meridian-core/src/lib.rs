//! # Meridian Core
//!
//! Core types shared by every Meridian crate.
//!
//! This crate provides the foundational types used throughout Meridian:
//!
//! - [`MeridianError`] - The framework error taxonomy (configuration, client
//!   validation, internal)
//! - [`ErrorMessage`] - A single field-level validation message returned to clients
//! - [`ParamSource`] - Which part of a request a value came from
//! - [`RequestId`] - UUID v7 request identifier used for log correlation

#![doc(html_root_url = "https://docs.rs/meridian-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod message;

pub use context::RequestId;
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, MeridianError, MeridianResult};
pub use message::{ErrorMessage, ParamSource};
