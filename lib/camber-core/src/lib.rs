//! Core types for the camber API client bindings.
//!
//! This crate holds the request-construction pipeline shared by every
//! bound operation:
//! - [`PathTemplate`] - `{param}` path template compiler
//! - [`path`] - base/resource/command path joining
//! - [`form`] - bracket-notation form serialization
//! - [`OperationSpec`] - declarative operation description
//! - [`resolve`] / [`CallArgs`] / [`RequestIntent`] - argument resolution
//! - [`Request`], [`Response`], [`classify`] - wire types and the response
//!   classifier
//! - [`Error`] and [`Result`] - the error taxonomy
//! - [`HttpClient`] - transport trait implemented by the pooled agent

mod args;
mod client;
mod error;
pub mod form;
mod method;
pub mod path;
pub mod prelude;
mod request;
mod response;
mod spec;
mod template;

pub use args::{CallArgs, RequestIntent, resolve};
pub use client::HttpClient;
pub use error::{ApiFailure, Error, Result};
pub use method::Method;
pub use request::Request;
pub use response::{ApiObject, REQUEST_ID_HEADER, Response, Transport, classify};
pub use spec::{EncodeFn, OperationSpec, TransformFn, ValidatorFn};
pub use template::{PathTemplate, Substitutions, encode_component};

// Used by the `args!` macro.
#[doc(hidden)]
pub use serde_json as __serde_json;
