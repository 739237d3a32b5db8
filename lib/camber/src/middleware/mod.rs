//! Tower middleware for the transport agent.

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-exported for custom `.layer()` compositions.
pub use tower::{Layer, ServiceBuilder};
