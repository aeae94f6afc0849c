//! Cache module
//!
//! Everything that describes a stored response and how it is keyed:
//! - `control`: Cache-Control evaluation (cacheability and TTL)
//! - `fingerprint`: cache key derivation
//! - `header`: the wire-form header record persisted with each entry
//! - `entry`: the stored unit exchanged with the store
//! - `traits` / `memory`: the store contract and a moka-backed implementation

pub mod config;
pub mod control;
pub mod entry;
pub mod error;
pub mod fingerprint;
pub mod header;
pub mod memory;
pub mod stats;
pub mod traits;

pub use config::CacheConfig;
pub use control::{cache_ttl, CacheControl};
pub use entry::{now_seconds, CacheEntry, CompressState};
pub use error::StoreError;
pub use fingerprint::{Fingerprint, KeyFormat};
pub use header::{HeaderField, HeaderRecord};
pub use memory::MemoryStore;
pub use stats::{StoreStats, STORE_STAT_COUNT};
pub use traits::CacheStore;
