//! Prelude module for convenient imports.
//!
//! ```ignore
//! use camber_core::prelude::*;
//! ```

pub use crate::{
    ApiObject, CallArgs, Error, HttpClient, Method, OperationSpec, PathTemplate, Request,
    RequestIntent, Response, Result, classify, resolve,
};
