//! Pooled HTTP transport agent built on hyper-util.
//!
//! The agent owns the connection pool and the per-exchange timeout, and
//! applies the retry policy for idempotent requests. Tower layers added via
//! the builder wrap every attempt.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use camber_core::{Error, Request, Response, Result};

use crate::connector::https_connector;
use crate::middleware::LoggingLayer;
use crate::retry::RetryPolicy;

/// Type-erased service, so arbitrary Tower layers compose without exposing
/// their generics.
pub type BoxedService = BoxCloneService<Request, Response, Error>;

/// Future type for the Tower service implementations.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Thread-safe wrapper making the boxed service `Sync`, as the
/// [`camber_core::HttpClient`] trait requires.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request) -> ServiceFuture {
        // Lock, clone the service, release immediately.
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

/// Raw pooled client; one attempt per call, bounded by the timeout.
#[derive(Clone)]
struct RawAgent {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl RawAgent {
    fn new(timeout: Duration, pool_idle_per_host: usize, pool_idle_timeout: Duration) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(pool_idle_timeout)
            .pool_max_idle_per_host(pool_idle_per_host)
            .build(https_connector());

        Self { inner, timeout }
    }

    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(Full::new(body))
            .map_err(|e| Error::invalid_argument(e.to_string()))
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let hyper_request = Self::build_hyper_request(request)?;

        // One deadline covers the whole exchange, body receipt included. A
        // server stalling mid-body must not hold the caller past the
        // timeout.
        tokio::time::timeout(self.timeout, self.exchange(hyper_request))
            .await
            .map_err(|_| Error::timed_out(self.timeout, 0))?
    }

    async fn exchange(&self, hyper_request: http::Request<Full<Bytes>>) -> Result<Response> {
        let response = self
            .inner
            .request(hyper_request)
            .await
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_owned()))
            })
            .collect();

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string(), None, 0))?
            .to_bytes();

        Ok(Response::new(status, headers, body))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        let detail = if err.is_connect() {
            Some("connect".to_owned())
        } else if msg.contains("tls") || msg.contains("certificate") {
            Some("tls".to_owned())
        } else {
            None
        };

        Error::connection(msg, detail, 0)
    }
}

impl Service<Request> for RawAgent {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let agent = self.clone();
        Box::pin(async move { agent.execute(request).await })
    }
}

/// HTTP transport agent with connection pooling, TLS, per-exchange timeout,
/// bounded retry, and middleware support.
#[derive(Clone)]
pub struct HttpAgent {
    service: SyncService,
    retry: RetryPolicy,
}

impl std::fmt::Debug for HttpAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAgent")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl HttpAgent {
    /// Agent with default settings and no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create an agent builder.
    #[must_use]
    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let mut attempt: u32 = 0;
        loop {
            match self.service.call(request.clone()).await {
                Ok(response) => {
                    if RetryPolicy::retryable_response(&response)
                        && self.retry.allows(request.method(), attempt)
                    {
                        tracing::debug!(
                            status = response.status(),
                            attempt,
                            "retrying after retryable status"
                        );
                        tokio::time::sleep(RetryPolicy::backoff(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(error) => {
                    if RetryPolicy::retryable_error(&error)
                        && self.retry.allows(request.method(), attempt)
                    {
                        tracing::debug!(error = %error, attempt, "retrying after connection error");
                        tokio::time::sleep(RetryPolicy::backoff(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(annotate_retries(error, attempt));
                }
            }
        }
    }
}

/// Record how many re-attempts preceded the final connection failure.
fn annotate_retries(error: Error, attempt: u32) -> Error {
    match error {
        Error::Connection {
            message, detail, ..
        } => Error::Connection {
            message,
            detail,
            retries: attempt,
        },
        other => other,
    }
}

impl Default for HttpAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl camber_core::HttpClient for HttpAgent {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.send(request).await
    }
}

impl Service<Request> for HttpAgent {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let agent = self.clone();
        Box::pin(async move { agent.send(request).await })
    }
}

/// Builder for [`HttpAgent`].
#[derive(Default)]
pub struct AgentBuilder {
    timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
    max_retries: Option<u32>,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for AgentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentBuilder")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl AgentBuilder {
    /// Set the per-exchange timeout (applied to every attempt separately).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum idle pooled connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle pooled connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Allow up to `max_retries` re-attempts for idempotent requests.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Add a Tower layer around the transport.
    ///
    /// Layers are applied in order: first added wraps outermost, and every
    /// retry attempt passes through them.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Add request/response logging.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Add debug-level logging (includes headers).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the agent.
    #[must_use]
    pub fn build(self) -> HttpAgent {
        let raw = RawAgent::new(
            self.timeout.unwrap_or(crate::config::DEFAULT_TIMEOUT),
            self.pool_idle_per_host.unwrap_or(32),
            self.pool_idle_timeout.unwrap_or(Duration::from_secs(90)),
        );

        let mut service: BoxedService = BoxCloneService::new(raw);
        for layer_fn in self.layers {
            service = layer_fn(service);
        }

        HttpAgent {
            service: SyncService::new(service),
            retry: RetryPolicy::new(self.max_retries.unwrap_or(0)),
        }
    }
}
