//! Store statistics
//!
//! `StoreStats` is the fixed set of gauges a store reports for the metrics
//! snapshot. Every store fills all fields; fields a backend cannot measure
//! stay at zero so the snapshot shape never changes.

use serde::Serialize;

/// Number of named gauges in [`StoreStats::entries`]
pub const STORE_STAT_COUNT: usize = 14;

/// Statistics reported by a `CacheStore`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Entries currently held
    pub entry_count: u64,
    /// Weighted size of all entries in bytes
    pub size_bytes: u64,
    /// Configured capacity in bytes
    pub max_size_bytes: u64,
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Removed to make room
    pub evictions: u64,
    /// Removed because their TTL elapsed
    pub expirations: u64,
    /// Sets refused (zero TTL, too large)
    pub rejected: u64,
    /// Entries stored gzip-encoded
    pub gzip_entries: u64,
    /// Entries stored raw
    pub raw_entries: u64,
    /// Body bytes across all entries
    pub body_bytes: u64,
    /// Header blob bytes across all entries
    pub header_bytes: u64,
}

impl StoreStats {
    /// Hit rate (hits / lookups), 0.0 with no lookups
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Named gauges in a stable order
    pub fn entries(&self) -> [(&'static str, u64); STORE_STAT_COUNT] {
        [
            ("store_entry_count", self.entry_count),
            ("store_size_bytes", self.size_bytes),
            ("store_max_size_bytes", self.max_size_bytes),
            ("store_hits", self.hits),
            ("store_misses", self.misses),
            ("store_sets", self.sets),
            ("store_deletes", self.deletes),
            ("store_evictions", self.evictions),
            ("store_expirations", self.expirations),
            ("store_rejected", self.rejected),
            ("store_gzip_entries", self.gzip_entries),
            ("store_raw_entries", self.raw_entries),
            ("store_body_bytes", self.body_bytes),
            ("store_header_bytes", self.header_bytes),
        ]
    }
}
