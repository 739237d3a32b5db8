//! Client configuration.
//!
//! One [`ClientConfig`] holds everything the request executor consults per
//! exchange: credentials, endpoint location, timeout, protocol version, and
//! connection-pool knobs. Built once, immutable afterwards.

use std::time::Duration;

use camber_core::{Error, Result};

/// Default API host.
pub const DEFAULT_HOST: &str = "api.camber.io";
/// Default API port.
pub const DEFAULT_PORT: u16 = 443;
/// Default base path prefixed to every request.
pub const DEFAULT_BASE_PATH: &str = "/public/v1/";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Wire protocol of the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Plaintext HTTP.
    Http,
    /// TLS.
    #[default]
    Https,
}

impl Protocol {
    /// URL scheme string.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Application metadata advertised in the user-agent headers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AppInfo {
    /// Application name (required).
    pub name: String,
    /// Application version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Application URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Partner identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
}

impl AppInfo {
    /// Create application metadata with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            url: None,
            partner_id: None,
        }
    }

    /// Formatted `name/version (url)` suffix for the `User-Agent` header.
    #[must_use]
    pub fn formatted(&self) -> String {
        let mut formatted = self.name.clone();
        if let Some(version) = &self.version {
            formatted.push('/');
            formatted.push_str(version);
        }
        if let Some(url) = &self.url {
            formatted.push_str(&format!(" ({url})"));
        }
        formatted
    }
}

/// Configuration consulted by the request executor.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bare API secret; `Bearer ` is prefixed at header composition.
    pub api_key: String,
    /// API host.
    pub host: String,
    /// API port.
    pub port: u16,
    /// Wire protocol.
    pub protocol: Protocol,
    /// Base path prefixed to every resource path.
    pub base_path: String,
    /// Optional protocol version sent as `Camber-Version`.
    pub api_version: Option<String>,
    /// Per-exchange timeout.
    pub timeout: Duration,
    /// Application metadata for the user-agent headers.
    pub app_info: Option<AppInfo>,
    /// Maximum retry attempts for idempotent requests.
    pub max_retries: u32,
    /// Maximum idle pooled connections per host.
    pub pool_idle_per_host: usize,
    /// Idle pooled connection timeout.
    pub pool_idle_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    protocol: Option<Protocol>,
    base_path: Option<String>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    app_info: Option<AppInfo>,
    max_retries: Option<u32>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Set the API secret.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the API port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the wire protocol.
    #[must_use]
    pub const fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Set the base path.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Set the protocol version sent as `Camber-Version`.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Set the per-exchange timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set application metadata.
    #[must_use]
    pub fn app_info(mut self, app_info: AppInfo) -> Self {
        self.app_info = Some(app_info);
        self
    }

    /// Set the maximum retry attempts for idempotent requests.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
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

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Fails when no API key was supplied, or the key is empty.
    pub fn build(self) -> Result<ClientConfig> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::invalid_argument("you must set a valid API secret"))?;

        Ok(ClientConfig {
            api_key,
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            protocol: self.protocol.unwrap_or_default(),
            base_path: self
                .base_path
                .unwrap_or_else(|| DEFAULT_BASE_PATH.to_owned()),
            api_version: self.api_version,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            app_info: self.app_info,
            max_retries: self.max_retries.unwrap_or(0),
            pool_idle_per_host: self.pool_idle_per_host.unwrap_or(32),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(Duration::from_secs(90)),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::builder()
            .api_key("sk_test_1")
            .build()
            .expect("config");
        check!(config.host == DEFAULT_HOST);
        check!(config.port == DEFAULT_PORT);
        check!(config.protocol == Protocol::Https);
        check!(config.base_path == DEFAULT_BASE_PATH);
        check!(config.timeout == DEFAULT_TIMEOUT);
        check!(config.max_retries == 0);
    }

    #[test]
    fn missing_or_empty_key_is_rejected() {
        check!(ClientConfig::builder().build().is_err());
        check!(ClientConfig::builder().api_key("").build().is_err());
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::builder()
            .api_key("sk_test_1")
            .host("localhost")
            .port(8080)
            .protocol(Protocol::Http)
            .timeout(Duration::from_millis(250))
            .api_version("2026-01-01")
            .build()
            .expect("config");
        check!(config.host == "localhost");
        check!(config.port == 8080);
        check!(config.protocol.scheme() == "http");
        check!(config.api_version.as_deref() == Some("2026-01-01"));
    }

    #[test]
    fn app_info_formatting() {
        let mut info = AppInfo::new("CampKeeper");
        check!(info.formatted() == "CampKeeper");
        info.version = Some("2.1".into());
        info.url = Some("https://campkeeper.example".into());
        check!(info.formatted() == "CampKeeper/2.1 (https://campkeeper.example)");
    }
}
