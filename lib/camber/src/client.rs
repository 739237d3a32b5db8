//! Client handle.
//!
//! A [`Camber`] is a cheap-to-clone handle over one immutable configuration
//! and one pooled transport agent. Resources and their bound operations are
//! created from it.

use std::sync::Arc;

use camber_core::Result;

use crate::agent::HttpAgent;
use crate::config::{AppInfo, ClientConfig, ClientConfigBuilder, Protocol};
use crate::resource::Resource;

struct Inner {
    config: ClientConfig,
    agent: HttpAgent,
}

/// API client handle.
///
/// # Example
///
/// ```ignore
/// use camber::prelude::*;
///
/// let client = Camber::new("sk_test_...")?;
/// let campsites = client.resource("campsites");
/// let retrieve = campsites.operation(OperationSpec::new(Method::Get, "/{campsiteId}"));
/// let campsite = retrieve.call(args!["camp_123"]).await?;
/// ```
#[derive(Clone)]
pub struct Camber {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Camber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camber")
            .field("host", &self.inner.config.host)
            .field("base_path", &self.inner.config.base_path)
            .finish_non_exhaustive()
    }
}

impl Camber {
    /// Client with default configuration and the given API secret.
    ///
    /// # Errors
    ///
    /// Fails when the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client builder.
    #[must_use]
    pub fn builder() -> CamberBuilder {
        CamberBuilder::default()
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Transport agent.
    #[must_use]
    pub(crate) fn agent(&self) -> &HttpAgent {
        &self.inner.agent
    }

    /// Create a resource rooted at `path` (relative to the base path).
    #[must_use]
    pub fn resource(&self, path: impl Into<String>) -> Resource {
        Resource::new(self.clone(), path.into())
    }
}

/// Builder for [`Camber`].
#[derive(Default)]
pub struct CamberBuilder {
    config: ClientConfigBuilder,
    agent: Option<HttpAgent>,
    logging: bool,
}

impl std::fmt::Debug for CamberBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CamberBuilder")
            .field("config", &self.config)
            .field("custom_agent", &self.agent.is_some())
            .finish()
    }
}

impl CamberBuilder {
    /// Set the API secret.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config = self.config.api_key(key);
        self
    }

    /// Set the API host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config = self.config.host(host);
        self
    }

    /// Set the API port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config = self.config.port(port);
        self
    }

    /// Set the wire protocol.
    #[must_use]
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config = self.config.protocol(protocol);
        self
    }

    /// Set the base path.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config = self.config.base_path(base_path);
        self
    }

    /// Set the protocol version sent as `Camber-Version`.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config = self.config.api_version(version);
        self
    }

    /// Set the per-exchange timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set application metadata, advertised in the user-agent headers.
    #[must_use]
    pub fn app_info(mut self, app_info: AppInfo) -> Self {
        self.config = self.config.app_info(app_info);
        self
    }

    /// Allow up to `max_retries` re-attempts for idempotent requests.
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config = self.config.max_retries(max_retries);
        self
    }

    /// Set the maximum idle pooled connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle pooled connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Enable request/response logging on the built agent.
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.logging = true;
        self
    }

    /// Use a pre-built transport agent instead of constructing one from the
    /// configuration.
    #[must_use]
    pub fn agent(mut self, agent: HttpAgent) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails when no API key was supplied, or the key is empty.
    pub fn build(self) -> Result<Camber> {
        let config = self.config.build()?;

        let agent = match self.agent {
            Some(agent) => agent,
            None => {
                let mut builder = HttpAgent::builder()
                    .timeout(config.timeout)
                    .pool_idle_per_host(config.pool_idle_per_host)
                    .pool_idle_timeout(config.pool_idle_timeout)
                    .max_retries(config.max_retries);
                if self.logging {
                    builder = builder.with_logging();
                }
                builder.build()
            }
        };

        Ok(Camber {
            inner: Arc::new(Inner { config, agent }),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn missing_key_is_rejected() {
        check!(Camber::builder().build().is_err());
        check!(Camber::new("").is_err());
    }

    #[test]
    fn handle_is_cheap_to_clone() {
        let client = Camber::new("sk_test_1").expect("client");
        let cloned = client.clone();
        check!(Arc::ptr_eq(&client.inner, &cloned.inner));
    }

    #[test]
    fn builder_threads_configuration() {
        let client = Camber::builder()
            .api_key("sk_test_1")
            .host("localhost")
            .port(4010)
            .protocol(Protocol::Http)
            .base_path("/v2/")
            .max_retries(1)
            .with_logging()
            .build()
            .expect("client");
        check!(client.config().host == "localhost");
        check!(client.config().port == 4010);
        check!(client.config().base_path == "/v2/");
        check!(client.config().max_retries == 1);
    }
}
