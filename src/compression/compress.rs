//! gzip codec for cached bodies.
//!
//! Inflation is always bounded so a small stored or upstream body cannot
//! expand without limit.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::error::CompressionError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// True if `data` starts with the gzip magic bytes
pub fn looks_like_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// gzip-encode `data` at `level` (clamped to 0-9)
pub fn gzip(data: &[u8], level: u32) -> Result<Vec<u8>, CompressionError> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(data.len() / 2 + 32),
        Compression::new(level.min(9)),
    );
    if let Err(e) = encoder.write_all(data) {
        return Err(CompressionError::CompressionFailed(e.to_string()));
    }
    encoder
        .finish()
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))
}

/// Inflate a gzip stream, refusing output longer than `limit` bytes
pub fn gunzip(data: &[u8], limit: usize) -> Result<Vec<u8>, CompressionError> {
    if !looks_like_gzip(data) {
        return Err(CompressionError::DecompressionFailed(
            "missing gzip magic bytes".to_string(),
        ));
    }

    // one extra byte tells "exactly at the limit" from "over it"
    let mut inflated = Vec::with_capacity(data.len().saturating_mul(4).min(limit));
    GzDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut inflated)
        .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))?;

    if inflated.len() > limit {
        return Err(CompressionError::SizeLimitExceeded { limit });
    }
    Ok(inflated)
}
