//! Memory store implementation
//!
//! `MemoryStore` is a `CacheStore` backed by moka. Each entry expires on its
//! own TTL (`created_at + ttl_seconds`); capacity is bounded by the weighted
//! entry size.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::notification::RemovalCause;
use moka::Expiry;

use super::config::CacheConfig;
use super::entry::{now_seconds, CacheEntry, CompressState};
use super::error::StoreError;
use super::fingerprint::Fingerprint;
use super::stats::StoreStats;
use super::traits::CacheStore;

/// Operation counters using atomics for thread safety
#[derive(Default)]
pub(crate) struct StoreStatsTracker {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    rejected: AtomicU64,
}

impl StoreStatsTracker {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn load(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Per-entry expiry derived from the entry's own timestamps
struct EntryExpiry;

impl EntryExpiry {
    fn remaining(entry: &CacheEntry) -> Duration {
        let now = now_seconds() as u64;
        Duration::from_secs(entry.expires_at().saturating_sub(now))
    }
}

impl Expiry<Fingerprint, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &Fingerprint,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Self::remaining(value))
    }

    fn expire_after_update(
        &self,
        _key: &Fingerprint,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Self::remaining(value))
    }
}

/// In-process store backed by moka
pub struct MemoryStore {
    cache: moka::future::Cache<Fingerprint, CacheEntry>,
    stats: Arc<StoreStatsTracker>,
    max_size_bytes: u64,
    max_entry_size_bytes: u64,
}

impl MemoryStore {
    /// Create a new MemoryStore from configuration
    pub fn new(config: &CacheConfig) -> Self {
        let stats = Arc::new(StoreStatsTracker::default());
        let listener_stats = stats.clone();

        let cache = moka::future::Cache::builder()
            .max_capacity(config.max_size_bytes)
            .weigher(|_key, entry: &CacheEntry| {
                u32::try_from(entry.size_bytes()).unwrap_or(u32::MAX)
            })
            .expire_after(EntryExpiry)
            .eviction_listener(move |_key, _value, cause| match cause {
                RemovalCause::Size => StoreStatsTracker::bump(&listener_stats.evictions),
                RemovalCause::Expired => StoreStatsTracker::bump(&listener_stats.expirations),
                // Explicit removals and replacements are not evictions
                _ => {}
            })
            .build();

        Self {
            cache,
            stats,
            max_size_bytes: config.max_size_bytes,
            max_entry_size_bytes: config.max_entry_size_bytes,
        }
    }

    /// Force moka to process pending evictions and expirations
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Approximate entry count (eventually consistent)
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &Fingerprint) -> Result<Option<CacheEntry>, StoreError> {
        match self.cache.get(key).await {
            // moka's timer may lag the wall clock; a stale entry is never served
            Some(entry) if entry.is_stale(now_seconds()) => {
                self.cache.invalidate(key).await;
                StoreStatsTracker::bump(&self.stats.expirations);
                StoreStatsTracker::bump(&self.stats.misses);
                Ok(None)
            }
            Some(entry) => {
                StoreStatsTracker::bump(&self.stats.hits);
                Ok(Some(entry))
            }
            None => {
                StoreStatsTracker::bump(&self.stats.misses);
                Ok(None)
            }
        }
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), StoreError> {
        if !entry.is_cacheable() {
            StoreStatsTracker::bump(&self.stats.rejected);
            return Err(StoreError::NotCacheable);
        }

        let size = entry.size_bytes() as u64;
        if size > self.max_entry_size_bytes {
            StoreStatsTracker::bump(&self.stats.rejected);
            return Err(StoreError::EntryTooLarge {
                size,
                limit: self.max_entry_size_bytes,
            });
        }

        tracing::debug!(
            key = %entry.key,
            ttl_seconds = entry.ttl_seconds,
            size_bytes = size,
            "Storing cache entry"
        );
        self.cache.insert(entry.key.clone(), entry).await;
        StoreStatsTracker::bump(&self.stats.sets);
        Ok(())
    }

    async fn delete(&self, key: &Fingerprint) -> Result<bool, StoreError> {
        let existed = self.cache.remove(key).await.is_some();
        if existed {
            StoreStatsTracker::bump(&self.stats.deletes);
        }
        Ok(existed)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats {
            entry_count: 0,
            size_bytes: self.cache.weighted_size(),
            max_size_bytes: self.max_size_bytes,
            hits: StoreStatsTracker::load(&self.stats.hits),
            misses: StoreStatsTracker::load(&self.stats.misses),
            sets: StoreStatsTracker::load(&self.stats.sets),
            deletes: StoreStatsTracker::load(&self.stats.deletes),
            evictions: StoreStatsTracker::load(&self.stats.evictions),
            expirations: StoreStatsTracker::load(&self.stats.expirations),
            rejected: StoreStatsTracker::load(&self.stats.rejected),
            ..Default::default()
        };

        for (_key, entry) in self.cache.iter() {
            stats.entry_count += 1;
            match entry.compress_state {
                CompressState::Gzip => stats.gzip_entries += 1,
                CompressState::None => stats.raw_entries += 1,
            }
            stats.body_bytes += entry.body.len() as u64;
            stats.header_bytes += entry.raw_header.len() as u64;
        }

        Ok(stats)
    }
}
