//! Transport client trait.

use std::future::Future;

use crate::{Request, Response, Result};

/// Transport abstraction executing one HTTP exchange.
///
/// The pooled agent in the `camber` crate is the production implementation;
/// tests substitute their own to drive the pipeline without a network.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the buffered response.
    ///
    /// # Errors
    ///
    /// Returns a connection-class error on transport failure or timeout.
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}
