//! Store trait definition
//!
//! The persistent key/value store lives outside the serving core. This trait
//! is the contract it has to fulfil: entries in, entries out, statistics for
//! the metrics snapshot.

use async_trait::async_trait;

use super::entry::CacheEntry;
use super::error::StoreError;
use super::fingerprint::Fingerprint;
use super::stats::StoreStats;

/// Persistent store for cache entries
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get an entry by fingerprint.
    /// Returns None if the key is unknown or the store already dropped it.
    async fn get(&self, key: &Fingerprint) -> Result<Option<CacheEntry>, StoreError>;

    /// Store an entry under `entry.key`, overwriting any previous one.
    /// Entries with `ttl_seconds == 0` must be refused.
    async fn set(&self, entry: CacheEntry) -> Result<(), StoreError>;

    /// Delete an entry. Returns true if it existed.
    async fn delete(&self, key: &Fingerprint) -> Result<bool, StoreError>;

    /// Current statistics
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}
