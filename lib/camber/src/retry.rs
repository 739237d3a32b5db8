//! Bounded retry policy for idempotent requests.
//!
//! Connection-class failures and 5xx/429 responses are re-attempted with
//! exponential backoff, for idempotent methods only. The policy is off by
//! default (`max_retries == 0`).

use std::time::Duration;

use camber_core::{Error, Method, Response};

/// Delay before the first retry.
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);
/// Cap on the backoff delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Retry policy applied by the transport agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    /// Policy allowing up to `max_retries` re-attempts.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Maximum re-attempts.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether attempt number `attempt` (zero-based) may be retried for
    /// `method`.
    #[must_use]
    pub const fn allows(&self, method: Method, attempt: u32) -> bool {
        method.is_idempotent() && attempt < self.max_retries
    }

    /// Responses worth retrying: server errors and rate limiting.
    #[must_use]
    pub const fn retryable_response(response: &Response) -> bool {
        response.status() >= 500 || response.status() == 429
    }

    /// Errors worth retrying: connection-class only.
    #[must_use]
    pub const fn retryable_error(error: &Error) -> bool {
        error.is_connection()
    }

    /// Backoff before re-attempt number `attempt` (zero-based), doubling
    /// from the initial delay up to the cap.
    #[must_use]
    pub fn backoff(attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        INITIAL_RETRY_DELAY.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }
}
