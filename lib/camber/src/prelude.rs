//! Prelude module for convenient imports.
//!
//! ```ignore
//! use camber::prelude::*;
//! ```

pub use camber_core::{
    ApiObject, CallArgs, Error, Method, OperationSpec, Request, Response, Result, args,
};

pub use crate::agent::HttpAgent;
pub use crate::client::{Camber, CamberBuilder};
pub use crate::config::{AppInfo, ClientConfig, Protocol};
pub use crate::resource::{Operation, Resource};
