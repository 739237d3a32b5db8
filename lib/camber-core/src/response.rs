//! Transport responses and the response classifier.
//!
//! [`Response`] is the raw transport result. [`classify`] accumulates
//! nothing itself (the agent already buffered the body); it parses the
//! body, maps error-bearing payloads and parse failures onto the error
//! taxonomy, and otherwise yields an [`ApiObject`] carrying the parsed
//! value alongside the transport details.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde_json::Value;

use crate::{ApiFailure, Error, Result};

/// Response header carrying the server-side correlation id.
pub const REQUEST_ID_HEADER: &str = "request-id";

/// HTTP response as returned by the transport.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Response body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Consume into `(status, headers, body)`.
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, Bytes) {
        (self.status, self.headers, self.body)
    }
}

/// Transport-level details of a completed exchange, exposed alongside the
/// parsed value without polluting its serialized form.
#[derive(Debug, Clone)]
pub struct Transport {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// `request-id` header, when present.
    pub request_id: Option<String>,
    /// Time elapsed since the exchange started.
    pub elapsed: Duration,
}

/// Parsed success value of one exchange.
#[derive(Debug, Clone)]
pub struct ApiObject {
    body: Value,
    transport: Transport,
}

impl ApiObject {
    /// Parsed JSON body.
    #[must_use]
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Transport details of the exchange.
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Replace the body, keeping the transport reference. Used by response
    /// transforms.
    #[must_use]
    pub fn map_body(self, f: impl FnOnce(Value) -> Value) -> Self {
        Self {
            body: f(self.body),
            transport: self.transport,
        }
    }

    /// Deserialize the body into a typed value, with path context on
    /// failure.
    pub fn deserialize_into<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_path_to_error::deserialize(self.body.clone()).map_err(|e| {
            Error::Api(ApiFailure {
                message: Some(format!(
                    "deserialization error at '{}': {}",
                    e.path(),
                    e.inner()
                )),
                status: Some(self.transport.status),
                request_id: self.transport.request_id.clone(),
                headers: self.transport.headers.clone(),
                ..ApiFailure::default()
            })
        })
    }
}

// Serialization exposes the body only; the transport reference stays
// invisible, the way the original kept it non-enumerable.
impl serde::Serialize for ApiObject {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

/// Classify a transport response into a parsed success value or a typed
/// error. `started` is the instant the exchange began.
///
/// # Errors
///
/// - non-JSON body: [`Error::Api`] carrying the raw text;
/// - body with an `error` field: the kind selected by status code
///   (401/403/429) or by the declared error type.
pub fn classify(response: Response, started: Instant) -> Result<ApiObject> {
    let (status, headers, body) = response.into_parts();
    let request_id = headers.get(REQUEST_ID_HEADER).cloned();

    let Ok(value) = serde_json::from_slice::<Value>(&body) else {
        return Err(Error::Api(ApiFailure {
            message: Some("invalid response body from API".to_owned()),
            status: Some(status),
            request_id,
            headers,
            raw_body: Some(String::from_utf8_lossy(&body).into_owned()),
            ..ApiFailure::default()
        }));
    };

    if let Some(error) = value.get("error") {
        let (error_type, message) = normalize_error(error);
        let failure = ApiFailure {
            error_type,
            message,
            status: Some(status),
            request_id,
            headers,
            raw_body: None,
        };
        return Err(Error::from_status(status, failure));
    }

    Ok(ApiObject {
        body: value,
        transport: Transport {
            status,
            headers,
            request_id,
            elapsed: started.elapsed(),
        },
    })
}

/// Normalize the server's `error` field. A bare string becomes a
/// `{type, message}` pair with both sides set to the string.
fn normalize_error(error: &Value) -> (Option<String>, Option<String>) {
    match error {
        Value::String(s) => (Some(s.clone()), Some(s.clone())),
        Value::Object(map) => (
            map.get("type").and_then(Value::as_str).map(str::to_owned),
            map.get("message")
                .and_then(Value::as_str)
                .map(str::to_owned),
        ),
        _ => (None, None),
    }
}
