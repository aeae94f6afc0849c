//! Store error types
//!
//! Errors reported by a `CacheStore` implementation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store cannot serve requests right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Entry has a zero TTL and must not be persisted
    #[error("Entry is not cacheable (ttl is 0)")]
    NotCacheable,

    /// Entry exceeds the per-entry size limit
    #[error("Entry too large: {size} bytes exceeds limit of {limit} bytes")]
    EntryTooLarge { size: u64, limit: u64 },
}
