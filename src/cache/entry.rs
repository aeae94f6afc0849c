//! Cache entry types
//!
//! `CacheEntry` is the unit exchanged with the persistent store. Headers stay
//! in their wire form (see [`HeaderRecord`](super::header::HeaderRecord)) and
//! are re-parsed on every serve.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::fingerprint::Fingerprint;
use super::header::HeaderRecord;

/// Whether a stored body is gzip-encoded at rest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressState {
    #[default]
    None,
    Gzip,
}

/// Current time as epoch seconds, the resolution entries are stamped with
pub fn now_seconds() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// A stored upstream response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Fingerprint of the request that produced this response
    pub key: Fingerprint,
    /// Header lines in wire form, without Content-Length/Content-Encoding
    pub raw_header: Bytes,
    /// Response payload, raw or gzip according to `compress_state`
    pub body: Bytes,
    pub compress_state: CompressState,
    pub status_code: u16,
    /// Lifetime in seconds; 0 means the entry must not be stored
    pub ttl_seconds: u32,
    /// Epoch seconds at write time
    pub created_at: u32,
}

impl CacheEntry {
    /// Create an entry stamped with the current time
    pub fn new(
        key: Fingerprint,
        headers: &HeaderRecord,
        body: Bytes,
        compress_state: CompressState,
        status_code: u16,
        ttl_seconds: u32,
    ) -> Self {
        Self {
            key,
            raw_header: headers.to_bytes(),
            body,
            compress_state,
            status_code,
            ttl_seconds,
            created_at: now_seconds(),
        }
    }

    /// Parsed view of `raw_header`
    pub fn header_record(&self) -> HeaderRecord {
        HeaderRecord::parse(&self.raw_header)
    }

    /// Whether this entry may be persisted at all
    pub fn is_cacheable(&self) -> bool {
        self.ttl_seconds > 0
    }

    /// Epoch second at which the entry becomes stale
    pub fn expires_at(&self) -> u64 {
        self.created_at as u64 + self.ttl_seconds as u64
    }

    /// Stale once `now >= created_at + ttl_seconds`
    pub fn is_stale(&self, now: u32) -> bool {
        now as u64 >= self.expires_at()
    }

    /// Seconds since the entry was written, clamped at 0 under clock skew
    pub fn age(&self, now: u32) -> u32 {
        now.saturating_sub(self.created_at)
    }

    /// Approximate memory footprint, used as the store weigher
    pub fn size_bytes(&self) -> usize {
        self.key.len() + self.raw_header.len() + self.body.len() + std::mem::size_of::<Self>()
    }
}
