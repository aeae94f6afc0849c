//! Response handler module for the proxy.
//!
//! Rebuilds a client response from a stored [`CacheEntry`]. Order matters:
//!
//! 1. stored header lines are applied to the outgoing headers
//! 2. `Age` is set for entries with a TTL
//! 3. conditional headers may short-circuit to 304 Not Modified
//! 4. the body is transcoded for the client's Accept-Encoding
//! 5. status, `Content-Length` and body are set
//!
//! The entry is never modified; transcoding works on a cheap `Bytes` clone.
//! A corrupt stored gzip body is turned into an error response.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, AGE, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, VARY};
use http::{Method, Response, StatusCode};

use super::error_handler::error_response;
use super::freshness::{self, ConditionalResult};
use crate::cache::CacheEntry;
use crate::compression::{
    add_vary_accept_encoding, request_accepts_gzip, transcode, TranscodeOptions, TranscodeOutcome,
};
use crate::error::ProxyError;

// ============================================================================
// Result Types
// ============================================================================

/// What the assembler did for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Client copy is current; 304 sent with headers only
    NotModified(ConditionalResult),
    /// Full response sent
    Full {
        conditional: ConditionalResult,
        transcode: TranscodeOutcome,
    },
    /// The entry could not be served; the error response was sent instead
    Failed(ProxyError),
}

/// Response ready to write plus how it was produced
#[derive(Debug)]
pub struct AssembledResponse {
    pub response: Response<Bytes>,
    pub outcome: ServeOutcome,
}

impl AssembledResponse {
    fn failed(err: ProxyError) -> Self {
        Self {
            response: error_response(&err),
            outcome: ServeOutcome::Failed(err),
        }
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Build the response for a cache hit.
///
/// # Arguments
///
/// * `method` - Request method (HEAD gets headers only).
/// * `request_headers` - Live request headers (validators, Accept-Encoding).
/// * `entry` - The stored entry to serve.
/// * `now` - Current epoch seconds, used for the `Age` header.
/// * `options` - Transcoding thresholds and limits.
pub fn assemble_response(
    method: &Method,
    request_headers: &HeaderMap,
    entry: &CacheEntry,
    now: u32,
    options: &TranscodeOptions,
) -> AssembledResponse {
    let status = match StatusCode::from_u16(entry.status_code) {
        Ok(status) => status,
        Err(_) => {
            return AssembledResponse::failed(ProxyError::Internal(format!(
                "stored entry {} has invalid status {}",
                entry.key, entry.status_code
            )))
        }
    };

    let mut headers = HeaderMap::new();
    let skipped = entry.header_record().apply_to(&mut headers);
    if skipped > 0 {
        tracing::debug!(key = %entry.key, skipped, "Stored header lines skipped");
    }

    if entry.ttl_seconds > 0 {
        headers.insert(AGE, HeaderValue::from(entry.age(now)));
    }

    let conditional = freshness::evaluate(method, entry.status_code, request_headers, &headers);
    if conditional.is_fresh() {
        tracing::debug!(key = %entry.key, ?conditional, "Serving 304 Not Modified");
        let mut response = Response::new(Bytes::new());
        *response.status_mut() = StatusCode::NOT_MODIFIED;
        *response.headers_mut() = headers;
        return AssembledResponse {
            response,
            outcome: ServeOutcome::NotModified(conditional),
        };
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let transcoded = match transcode(
        &entry.body,
        entry.compress_state,
        request_accepts_gzip(request_headers),
        content_type.as_deref(),
        options,
    ) {
        Ok(transcoded) => transcoded,
        Err(err) => {
            tracing::warn!(key = %entry.key, error = %err, "Stored body is corrupt");
            return AssembledResponse::failed(err.into());
        }
    };

    match &transcoded.outcome {
        TranscodeOutcome::CompressionFallback(err) => {
            tracing::debug!(key = %entry.key, error = %err, "Compression failed, sending raw body");
        }
        TranscodeOutcome::Unchanged(reason) => {
            tracing::trace!(key = %entry.key, ?reason, "Body sent unchanged");
        }
        _ => {}
    }

    if transcoded.gzip {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    } else {
        headers.remove(CONTENT_ENCODING);
    }

    if matches!(
        transcoded.outcome,
        TranscodeOutcome::Compressed
            | TranscodeOutcome::Decompressed
            | TranscodeOutcome::PassThroughGzip
    ) {
        // Stored records may carry several Vary lines; fold them into one
        let existing = headers
            .get_all(VARY)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");
        let vary = add_vary_accept_encoding(Some(&existing));
        if let Ok(value) = HeaderValue::from_str(&vary) {
            headers.insert(VARY, value);
        }
    }

    headers.insert(CONTENT_LENGTH, HeaderValue::from(transcoded.body.len()));

    let body = if *method == Method::HEAD {
        Bytes::new()
    } else {
        transcoded.body
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;

    AssembledResponse {
        response,
        outcome: ServeOutcome::Full {
            conditional,
            transcode: transcoded.outcome,
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
