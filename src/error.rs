// Error types module

use std::fmt;

use crate::cache::StoreError;
use crate::compression::CompressionError;

/// Centralized error type for the serving path
///
/// Only failures that make it impossible to produce a response end up here.
/// Recoverable conditions (bad cache-control values, missing validators,
/// compression failures) are absorbed where they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The upstream director has no healthy backend to send the request to
    UpstreamUnavailable(String),

    /// The proxy itself refuses service (overload, shutting down, etc.)
    ServiceUnavailable(String),

    /// Catch-all: corrupt stored bodies, unexpected collaborator failures
    Internal(String),
}

impl ProxyError {
    /// HTTP status code for this error
    ///
    /// Both unavailability kinds map to 503, everything else to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::UpstreamUnavailable(_) | ProxyError::ServiceUnavailable(_) => 503,
            ProxyError::Internal(_) => 500,
        }
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::UpstreamUnavailable(msg) => write!(f, "Upstream unavailable: {}", msg),
            ProxyError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ProxyError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {}

impl From<CompressionError> for ProxyError {
    fn from(err: CompressionError) -> Self {
        ProxyError::Internal(err.to_string())
    }
}

impl From<StoreError> for ProxyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ProxyError::ServiceUnavailable(msg),
            other => ProxyError::Internal(other.to_string()),
        }
    }
}
