//! Declarative operation specifications.
//!
//! An [`OperationSpec`] describes one API operation: its HTTP method, its
//! command path template, the query parameters it accepts, and optional
//! payload/response hooks. Specs are immutable, defined once per operation,
//! and owned by the resource that exposes them.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{ApiObject, Method, Result};

/// Payload transform applied to the merged request body.
pub type EncodeFn = Arc<dyn Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync>;

/// Payload validator invoked against the final body and headers; its failure
/// propagates as-is.
pub type ValidatorFn = Arc<dyn Fn(&Map<String, Value>, &[(String, String)]) -> Result<()> + Send + Sync>;

/// Response transform applied to the classified success value.
pub type TransformFn = Arc<dyn Fn(ApiObject) -> ApiObject + Send + Sync>;

/// Declarative description of one API operation.
#[derive(Clone)]
pub struct OperationSpec {
    method: Method,
    path: String,
    query_params: Vec<String>,
    encode: Option<EncodeFn>,
    validator: Option<ValidatorFn>,
    transform_response_data: Option<TransformFn>,
    host: Option<String>,
    headers: Vec<(String, String)>,
}

impl OperationSpec {
    /// Create a spec for `method` with the given command path template.
    ///
    /// URL parameters are inferred from the `{name}` placeholders of the
    /// resource and command paths at call time.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_params: Vec::new(),
            encode: None,
            validator: None,
            transform_response_data: None,
            host: None,
            headers: Vec::new(),
        }
    }

    /// Allowlist of query parameter names.
    #[must_use]
    pub fn query_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Payload transform applied after argument resolution.
    #[must_use]
    pub fn encode(
        mut self,
        encode: impl Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync + 'static,
    ) -> Self {
        self.encode = Some(Arc::new(encode));
        self
    }

    /// Validator run against the final payload and headers.
    #[must_use]
    pub fn validator(
        mut self,
        validator: impl Fn(&Map<String, Value>, &[(String, String)]) -> Result<()>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Transform applied to the classified success value.
    #[must_use]
    pub fn transform_response_data(
        mut self,
        transform: impl Fn(ApiObject) -> ApiObject + Send + Sync + 'static,
    ) -> Self {
        self.transform_response_data = Some(Arc::new(transform));
        self
    }

    /// Host override for this operation.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Fixed header sent with every request of this operation. Caller
    /// header overrides win on conflict.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Command path template string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Allowed query parameter names.
    #[must_use]
    pub fn allowed_query_params(&self) -> &[String] {
        &self.query_params
    }

    pub(crate) fn encode_fn(&self) -> Option<&EncodeFn> {
        self.encode.as_ref()
    }

    pub(crate) fn validator_fn(&self) -> Option<&ValidatorFn> {
        self.validator.as_ref()
    }

    /// Response transform, applied by the bound operation.
    #[must_use]
    pub fn transform_fn(&self) -> Option<&TransformFn> {
        self.transform_response_data.as_ref()
    }

    /// Host override, when declared.
    #[must_use]
    pub fn host_override(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Fixed headers declared on the spec.
    #[must_use]
    pub fn fixed_headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl std::fmt::Debug for OperationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationSpec")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query_params", &self.query_params)
            .field("host", &self.host)
            .field("headers", &self.headers)
            .field("encode", &self.encode.is_some())
            .field("validator", &self.validator.is_some())
            .field(
                "transform_response_data",
                &self.transform_response_data.is_some(),
            )
            .finish()
    }
}
