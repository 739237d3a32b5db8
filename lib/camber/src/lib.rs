//! API client bindings over a declarative operation pipeline.
//!
//! Operations are described by an [`OperationSpec`], bound to a [`Resource`],
//! and invoked with positional [`args!`]: URL parameters first, then an
//! optional payload object, then optional trailing options (a per-call API
//! key or an options object).
//!
//! # Example
//!
//! ```ignore
//! use camber::prelude::*;
//!
//! let client = Camber::new("sk_test_...")?;
//! let campsites = client.resource("campsites");
//!
//! let retrieve = campsites.operation(OperationSpec::new(Method::Get, "/{campsiteId}"));
//! let campsite = retrieve.call(args!["camp_123"]).await?;
//!
//! let create = campsites.operation(OperationSpec::new(Method::Post, ""));
//! let created = create.call(args![{"name": "Pine Hollow"}]).await?;
//! ```

mod agent;
mod client;
mod config;
mod connector;
mod executor;
pub mod middleware;
pub mod prelude;
mod resource;
mod retry;
mod user_agent;

pub use agent::{AgentBuilder, BoxedService, HttpAgent, ServiceFuture};
pub use client::{Camber, CamberBuilder};
pub use config::{
    AppInfo, ClientConfig, ClientConfigBuilder, DEFAULT_BASE_PATH, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_TIMEOUT, Protocol,
};
pub use resource::{Operation, Resource};
pub use retry::{INITIAL_RETRY_DELAY, MAX_RETRY_DELAY, RetryPolicy};
pub use user_agent::{client_user_agent, reset_client_user_agent};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use camber_core::{
    ApiFailure, ApiObject, CallArgs, Error, HttpClient, Method, OperationSpec, PathTemplate,
    REQUEST_ID_HEADER, Request, RequestIntent, Response, Result, Substitutions, Transport, args,
    classify, encode_component, form, path, resolve,
};
