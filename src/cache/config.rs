// Cache configuration

use serde::{Deserialize, Serialize};

use super::fingerprint::KeyFormat;
use crate::constants::{
    COMPRESS_MIN_LENGTH, DEFAULT_GZIP_LEVEL, DEFAULT_MAX_CACHE_SIZE_BYTES,
    DEFAULT_MAX_DECOMPRESSED_SIZE, DEFAULT_MAX_ENTRY_SIZE_BYTES,
};

/// Cache and serving behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Memory store capacity in bytes
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// Largest single entry the store accepts
    #[serde(default = "default_max_entry_size_bytes")]
    pub max_entry_size_bytes: u64,

    /// Bodies at or below this length are served uncompressed
    #[serde(default = "default_compress_min_length")]
    pub compress_min_length: usize,

    /// gzip level for serve-time and store-time compression (0-9)
    #[serde(default = "default_gzip_level")]
    pub gzip_level: u32,

    /// Upper bound when inflating stored gzip bodies
    #[serde(default = "default_max_decompressed_size")]
    pub max_decompressed_size: usize,

    /// Layout of fingerprint bytes; changing it orphans existing entries
    #[serde(default)]
    pub key_format: KeyFormat,

    /// Requests whose URI contains any of these tokens are never cached
    #[serde(default)]
    pub pass: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            max_entry_size_bytes: default_max_entry_size_bytes(),
            compress_min_length: default_compress_min_length(),
            gzip_level: default_gzip_level(),
            max_decompressed_size: default_max_decompressed_size(),
            key_format: KeyFormat::default(),
            pass: Vec::new(),
        }
    }
}

fn default_max_size_bytes() -> u64 {
    DEFAULT_MAX_CACHE_SIZE_BYTES
}

fn default_max_entry_size_bytes() -> u64 {
    DEFAULT_MAX_ENTRY_SIZE_BYTES
}

fn default_compress_min_length() -> usize {
    COMPRESS_MIN_LENGTH
}

fn default_gzip_level() -> u32 {
    DEFAULT_GZIP_LEVEL
}

fn default_max_decompressed_size() -> usize {
    DEFAULT_MAX_DECOMPRESSED_SIZE
}

impl CacheConfig {
    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_size_bytes == 0 {
            return Err("cache.max_size_bytes must be greater than 0".to_string());
        }
        if self.max_entry_size_bytes > self.max_size_bytes {
            return Err(format!(
                "cache.max_entry_size_bytes ({}) cannot exceed cache.max_size_bytes ({})",
                self.max_entry_size_bytes, self.max_size_bytes
            ));
        }
        if self.gzip_level > 9 {
            return Err(format!(
                "cache.gzip_level must be between 0 and 9, got {}",
                self.gzip_level
            ));
        }
        if self.max_decompressed_size == 0 {
            return Err("cache.max_decompressed_size must be greater than 0".to_string());
        }
        if let Some(empty) = self.pass.iter().position(|p| p.is_empty()) {
            return Err(format!("cache.pass[{}] cannot be empty", empty));
        }
        Ok(())
    }
}
