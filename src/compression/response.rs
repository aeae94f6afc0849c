//! Serve-time transcoding of cached bodies
//!
//! Decision table, evaluated in order:
//!
//! | stored | client gzip | compressible | length      | action                         |
//! |--------|-------------|--------------|-------------|--------------------------------|
//! | gzip   | no          | -            | -           | decompress                     |
//! | gzip   | yes         | -            | -           | send as-is, gzip encoding      |
//! | raw    | yes         | yes          | > min       | compress (raw on failure)      |
//! | raw    | yes         | no / <= min  | -           | send as-is                     |
//! | raw    | no          | -            | -           | send as-is                     |

use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;

use super::compress::{gunzip, gzip};
use super::error::CompressionError;
use crate::cache::{CacheConfig, CompressState};

/// Text-like content types worth compressing
fn compressible_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)text|javascript|json|xml").expect("static pattern is valid")
    })
}

/// Determines if a response should be compressed based on content type
///
/// Compressible: text/*, JavaScript, JSON and XML families (including
/// `+json` / `+xml` suffixes such as `image/svg+xml`).
pub fn is_compressible_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| compressible_pattern().is_match(ct))
}

/// Adds Accept-Encoding to a Vary header value, keeping existing entries
pub fn add_vary_accept_encoding(existing_vary: Option<&str>) -> String {
    match existing_vary {
        None => "Accept-Encoding".to_string(),
        Some(vary) if vary.trim().is_empty() => "Accept-Encoding".to_string(),
        Some(vary) => {
            let covered = vary
                .split(',')
                .map(str::trim)
                .any(|v| v == "*" || v.eq_ignore_ascii_case("accept-encoding"));
            if covered {
                vary.to_string()
            } else {
                format!("{}, Accept-Encoding", vary)
            }
        }
    }
}

/// Knobs for serve-time transcoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeOptions {
    /// Bodies must be strictly longer than this to be compressed
    pub min_length: usize,
    pub gzip_level: u32,
    pub max_decompressed_size: usize,
}

impl From<&CacheConfig> for TranscodeOptions {
    fn from(config: &CacheConfig) -> Self {
        Self {
            min_length: config.compress_min_length,
            gzip_level: config.gzip_level,
            max_decompressed_size: config.max_decompressed_size,
        }
    }
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

/// Why a raw body was sent untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ClientRefusesGzip,
    NotCompressible,
    BelowMinLength,
}

/// Which path of the decision table was taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeOutcome {
    /// Stored gzip body inflated for a client without gzip support
    Decompressed,
    /// Stored gzip body sent as-is
    PassThroughGzip,
    /// Raw body compressed for this response
    Compressed,
    /// Raw body sent as-is
    Unchanged(SkipReason),
    /// Compression was attempted and failed; raw body sent instead
    CompressionFallback(CompressionError),
}

/// Body ready to send plus the encoding it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded {
    pub body: Bytes,
    /// True when the body is gzip-encoded and `Content-Encoding: gzip` applies
    pub gzip: bool,
    pub outcome: TranscodeOutcome,
}

impl Transcoded {
    fn unchanged(body: &Bytes, reason: SkipReason) -> Self {
        Self {
            body: body.clone(),
            gzip: false,
            outcome: TranscodeOutcome::Unchanged(reason),
        }
    }
}

/// Pick and apply the transcoding for one response.
///
/// Only a corrupt stored gzip body is an error; a failed serve-time
/// compression falls back to the raw body and is reported through
/// [`TranscodeOutcome::CompressionFallback`]. The input body is never modified.
pub fn transcode(
    body: &Bytes,
    state: CompressState,
    client_accepts_gzip: bool,
    content_type: Option<&str>,
    options: &TranscodeOptions,
) -> Result<Transcoded, CompressionError> {
    match state {
        CompressState::Gzip if !client_accepts_gzip => {
            let raw = gunzip(body, options.max_decompressed_size)?;
            Ok(Transcoded {
                body: Bytes::from(raw),
                gzip: false,
                outcome: TranscodeOutcome::Decompressed,
            })
        }
        CompressState::Gzip => Ok(Transcoded {
            body: body.clone(),
            gzip: true,
            outcome: TranscodeOutcome::PassThroughGzip,
        }),
        CompressState::None if !client_accepts_gzip => {
            Ok(Transcoded::unchanged(body, SkipReason::ClientRefusesGzip))
        }
        CompressState::None if !is_compressible_content_type(content_type) => {
            Ok(Transcoded::unchanged(body, SkipReason::NotCompressible))
        }
        CompressState::None if body.len() <= options.min_length => {
            Ok(Transcoded::unchanged(body, SkipReason::BelowMinLength))
        }
        CompressState::None => match gzip(body, options.gzip_level) {
            Ok(compressed) => Ok(Transcoded {
                body: Bytes::from(compressed),
                gzip: true,
                outcome: TranscodeOutcome::Compressed,
            }),
            Err(err) => Ok(Transcoded {
                body: body.clone(),
                gzip: false,
                outcome: TranscodeOutcome::CompressionFallback(err),
            }),
        },
    }
}
