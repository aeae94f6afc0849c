// Metrics module - in-flight and throughput counters
// Provides the shared counters used for backpressure plus a fixed-shape snapshot
// combining them with store statistics, exportable as Prometheus text.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{CacheStore, StoreError, StoreStats, STORE_STAT_COUNT};

/// Number of named values in a [`MetricsSnapshot`]
pub const SNAPSHOT_METRIC_COUNT: usize = STORE_STAT_COUNT + 2;

/// ConcurrencyCounters tracks in-flight and total requests.
/// Thread-safe via atomic operations; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct ConcurrencyCounters {
    // Current in-flight requests, never below zero
    concurrency: AtomicU64,
    // Total requests seen since creation
    request_count: AtomicU64,
}

impl ConcurrencyCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request start. Returns the new in-flight count.
    pub fn increase_concurrency(&self) -> u64 {
        self.concurrency.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a request completion. Returns the new in-flight count.
    /// Saturates at zero, so an unbalanced call cannot wrap the counter.
    pub fn decrease_concurrency(&self) -> u64 {
        match self
            .concurrency
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(1))
            }) {
            Ok(previous) | Err(previous) => previous.saturating_sub(1),
        }
    }

    /// Count one more request. Returns the new total.
    pub fn increase_request_count(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn concurrency(&self) -> u64 {
        self.concurrency.load(Ordering::Relaxed)
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Start tracking a request: bumps both counters and returns a guard that
    /// decrements concurrency when dropped, on every exit path.
    pub fn track(self: &Arc<Self>) -> RequestGuard {
        self.increase_request_count();
        self.increase_concurrency();
        RequestGuard {
            counters: Arc::clone(self),
        }
    }

    /// Combine the counters with store statistics.
    /// Only loads the atomics; writers are never blocked.
    pub fn snapshot(&self, store: &StoreStats) -> MetricsSnapshot {
        MetricsSnapshot {
            concurrency: self.concurrency(),
            request_count: self.request_count(),
            store: store.clone(),
        }
    }

    /// Snapshot with statistics fetched from a store
    pub async fn snapshot_from(
        &self,
        store: &dyn CacheStore,
    ) -> Result<MetricsSnapshot, StoreError> {
        let stats = store.stats().await?;
        Ok(self.snapshot(&stats))
    }
}

/// Decrements concurrency once when dropped
#[derive(Debug)]
pub struct RequestGuard {
    counters: Arc<ConcurrencyCounters>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.counters.decrease_concurrency();
    }
}

/// Point-in-time view of all serving metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub concurrency: u64,
    pub request_count: u64,
    pub store: StoreStats,
}

impl MetricsSnapshot {
    /// Named values in a stable order; always [`SNAPSHOT_METRIC_COUNT`] long
    pub fn entries(&self) -> Vec<(&'static str, u64)> {
        let mut entries = Vec::with_capacity(SNAPSHOT_METRIC_COUNT);
        entries.push(("concurrency", self.concurrency));
        entries.push(("request_count", self.request_count));
        entries.extend(self.store.entries());
        entries
    }

    /// Look up a single value by name
    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Export in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP hayabusa_concurrency In-flight requests\n");
        output.push_str("# TYPE hayabusa_concurrency gauge\n");
        output.push_str(&format!("hayabusa_concurrency {}\n", self.concurrency));

        output.push_str("\n# HELP hayabusa_requests_total Total number of requests received\n");
        output.push_str("# TYPE hayabusa_requests_total counter\n");
        output.push_str(&format!("hayabusa_requests_total {}\n", self.request_count));

        output.push_str("\n# HELP hayabusa_store Cache store statistics\n");
        output.push_str("# TYPE hayabusa_store gauge\n");
        for (name, value) in self.store.entries() {
            output.push_str(&format!("hayabusa_{} {}\n", name, value));
        }

        output.push_str("\n# HELP hayabusa_store_hit_rate Store hit rate (0-1)\n");
        output.push_str("# TYPE hayabusa_store_hit_rate gauge\n");
        output.push_str(&format!(
            "hayabusa_store_hit_rate {:.4}\n",
            self.store.hit_rate()
        ));

        output
    }
}
