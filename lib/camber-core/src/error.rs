//! Error taxonomy for camber operations.
//!
//! Argument-resolution failures are synchronous and never reach the network
//! layer. Every network-phase failure is delivered through the single
//! `Result` resolution of the exchange, carrying enough context (status,
//! request id, headers, method and path) to correlate with server logs.

use std::collections::HashMap;

use derive_more::{Display, Error};

/// Context attached to an error-bearing or malformed API response.
#[derive(Debug, Clone, Default)]
pub struct ApiFailure {
    /// Server-declared error type (`invalid_request_error`, `api_error`, ...).
    pub error_type: Option<String>,
    /// Human-readable message from the server.
    pub message: Option<String>,
    /// HTTP status code of the response.
    pub status: Option<u16>,
    /// `request-id` response header, when present.
    pub request_id: Option<String>,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Raw body text, kept when the body could not be parsed.
    pub raw_body: Option<String>,
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.message, self.status) {
            (Some(message), Some(status)) => write!(f, "{message} (status {status})")?,
            (Some(message), None) => write!(f, "{message}")?,
            (None, Some(status)) => write!(f, "status {status}")?,
            (None, None) => write!(f, "unknown failure")?,
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " [request-id: {request_id}]")?;
        }
        Ok(())
    }
}

/// Main error type for camber operations.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Malformed or ambiguous caller arguments; raised before any network
    /// call.
    #[display("invalid argument: {_0}")]
    InvalidArgument(#[error(not(source))] String),

    /// Timeout or transport-level failure.
    #[display("connection error: {message}")]
    Connection {
        /// Human-readable summary.
        message: String,
        /// Underlying transport error text, when available.
        #[error(not(source))]
        detail: Option<String>,
        /// Retry attempts observed before this failure.
        retries: u32,
    },

    /// Malformed or non-JSON response body from the server.
    #[display("API error: {_0}")]
    Api(#[error(not(source))] ApiFailure),

    /// Status 401.
    #[display("authentication error: {_0}")]
    Authentication(#[error(not(source))] ApiFailure),

    /// Status 403.
    #[display("permission error: {_0}")]
    Permission(#[error(not(source))] ApiFailure),

    /// Status 429.
    #[display("rate limit error: {_0}")]
    RateLimit(#[error(not(source))] ApiFailure),

    /// Any other error-bearing response, labelled by the server-declared
    /// error type.
    #[display("application error: {_0}")]
    Application(#[error(not(source))] ApiFailure),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a connection error from a transport failure.
    #[must_use]
    pub fn connection(message: impl Into<String>, detail: Option<String>, retries: u32) -> Self {
        Self::Connection {
            message: message.into(),
            detail,
            retries,
        }
    }

    /// Create the connection-class error produced by a fired timeout.
    #[must_use]
    pub fn timed_out(timeout: std::time::Duration, retries: u32) -> Self {
        Self::Connection {
            message: format!(
                "request aborted due to timeout being reached ({}ms)",
                timeout.as_millis()
            ),
            detail: None,
            retries,
        }
    }

    /// Select the concrete error kind for an error-bearing response.
    ///
    /// Status wins (401/403/429); otherwise the server-declared error type
    /// picks between the API and application kinds.
    #[must_use]
    pub fn from_status(status: u16, failure: ApiFailure) -> Self {
        match status {
            401 => Self::Authentication(failure),
            403 => Self::Permission(failure),
            429 => Self::RateLimit(failure),
            _ => match failure.error_type.as_deref() {
                Some("api_error") => Self::Api(failure),
                _ => Self::Application(failure),
            },
        }
    }

    /// Returns `true` if this is a connection-class error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns `true` if this is an invalid-argument error.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// HTTP status code carried by the error, when any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.failure().and_then(|failure| failure.status)
    }

    /// `request-id` carried by the error, when any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.failure()
            .and_then(|failure| failure.request_id.as_deref())
    }

    /// API failure context, for response-derived errors.
    #[must_use]
    pub const fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Api(failure)
            | Self::Authentication(failure)
            | Self::Permission(failure)
            | Self::RateLimit(failure)
            | Self::Application(failure) => Some(failure),
            Self::InvalidArgument(_) | Self::Connection { .. } => None,
        }
    }

    /// Retry attempts observed, for connection-class errors.
    #[must_use]
    pub const fn retries(&self) -> Option<u32> {
        match self {
            Self::Connection { retries, .. } => Some(*retries),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn display_invalid_argument() {
        let err = Error::invalid_argument("extra arguments");
        check!(err.to_string() == "invalid argument: extra arguments");
    }

    #[test]
    fn display_timeout_connection() {
        let err = Error::timed_out(std::time::Duration::from_millis(500), 0);
        check!(
            err.to_string()
                == "connection error: request aborted due to timeout being reached (500ms)"
        );
        check!(err.is_connection());
        check!(err.retries() == Some(0));
    }

    #[test]
    fn from_status_selects_kind() {
        let failure = |t: Option<&str>| ApiFailure {
            error_type: t.map(str::to_owned),
            ..ApiFailure::default()
        };
        check!(matches!(
            Error::from_status(401, failure(None)),
            Error::Authentication(_)
        ));
        check!(matches!(
            Error::from_status(403, failure(None)),
            Error::Permission(_)
        ));
        check!(matches!(
            Error::from_status(429, failure(None)),
            Error::RateLimit(_)
        ));
        check!(matches!(
            Error::from_status(400, failure(Some("api_error"))),
            Error::Api(_)
        ));
        check!(matches!(
            Error::from_status(400, failure(Some("invalid_request_error"))),
            Error::Application(_)
        ));
    }

    #[test]
    fn failure_context_is_exposed() {
        let failure = ApiFailure {
            message: Some("no such campsite".into()),
            status: Some(404),
            request_id: Some("req_1".into()),
            ..ApiFailure::default()
        };
        let err = Error::from_status(404, failure);
        check!(err.status() == Some(404));
        check!(err.request_id() == Some("req_1"));
        check!(
            err.to_string() == "application error: no such campsite (status 404) [request-id: req_1]"
        );
    }
}
