//! Resources and bound operations.
//!
//! A [`Resource`] roots a family of operations at one path under the
//! client's base path. [`Resource::operation`] binds an [`OperationSpec`]
//! into a callable [`Operation`], the unit an API surface is assembled
//! from.

use std::sync::Arc;

use camber_core::{ApiObject, CallArgs, OperationSpec, Result, resolve};

use crate::client::Camber;
use crate::executor;

/// A resource rooted at a path relative to the client's base path.
#[derive(Debug, Clone)]
pub struct Resource {
    client: Camber,
    path: String,
}

impl Resource {
    pub(crate) fn new(client: Camber, path: String) -> Self {
        Self { client, path }
    }

    /// Resource path relative to the base path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolve `args` against `spec` and perform the exchange.
    ///
    /// # Errors
    ///
    /// Argument-resolution failures surface as
    /// [`Error::InvalidArgument`](camber_core::Error::InvalidArgument)
    /// before any network activity; network-phase failures carry the
    /// connection or API error context.
    pub async fn request(
        &self,
        spec: &OperationSpec,
        args: impl Into<CallArgs>,
    ) -> Result<ApiObject> {
        let config = self.client.config();
        let intent = resolve(spec, &config.base_path, &self.path, args.into())?;
        let object = executor::execute(self.client.agent(), config, intent).await?;
        Ok(match spec.transform_fn() {
            Some(transform) => transform(object),
            None => object,
        })
    }

    /// Bind `spec` into a callable operation on this resource.
    #[must_use]
    pub fn operation(&self, spec: OperationSpec) -> Operation {
        Operation {
            resource: self.clone(),
            spec: Arc::new(spec),
        }
    }
}

/// A callable operation bound to a resource.
#[derive(Debug, Clone)]
pub struct Operation {
    resource: Resource,
    spec: Arc<OperationSpec>,
}

impl Operation {
    /// Invoke the operation with the given call-time arguments.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`Resource::request`].
    pub async fn call(&self, args: impl Into<CallArgs>) -> Result<ApiObject> {
        self.resource.request(&self.spec, args).await
    }

    /// The operation description this was bound from.
    #[must_use]
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }
}
