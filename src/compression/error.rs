// Errors from the gzip codec

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionError {
    /// The encoder could not produce a gzip stream
    CompressionFailed(String),
    /// The stored or upstream body is not a valid gzip stream
    DecompressionFailed(String),
    /// Inflating would exceed the configured bound
    SizeLimitExceeded { limit: usize },
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionError::CompressionFailed(msg) => write!(f, "gzip encoding failed: {}", msg),
            CompressionError::DecompressionFailed(msg) => write!(f, "corrupt gzip body: {}", msg),
            CompressionError::SizeLimitExceeded { limit } => {
                write!(f, "gzip body inflates beyond {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for CompressionError {}
