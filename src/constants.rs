// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers keeps the defaults in one place.

// =============================================================================
// Compression defaults
// =============================================================================

/// Bodies at or below this many bytes are never compressed at serve time
pub const COMPRESS_MIN_LENGTH: usize = 512;

/// Default gzip level (flate2 scale, 0-9)
pub const DEFAULT_GZIP_LEVEL: u32 = 6;

/// Maximum size a stored gzip body may inflate to (64 MB)
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

// =============================================================================
// Cache defaults
// =============================================================================

/// Default memory store capacity (512 MB)
pub const DEFAULT_MAX_CACHE_SIZE_BYTES: u64 = 512 * 1024 * 1024;

/// Default largest body the store accepts (10 MB)
pub const DEFAULT_MAX_ENTRY_SIZE_BYTES: u64 = 10 * 1024 * 1024;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level directive
pub const DEFAULT_LOG_LEVEL: &str = "info";
