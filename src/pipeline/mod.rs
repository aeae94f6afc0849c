// Request pipeline module - wires fingerprinting, lookup, admission and serving
// around one request, holding the concurrency guard for its whole lifetime.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderMap, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_TYPE};
use http::{Method, Request, Response};

use crate::cache::{
    cache_ttl, now_seconds, CacheConfig, CacheEntry, CacheStore, CompressState, Fingerprint,
    HeaderRecord, StoreError,
};
use crate::compression::{gunzip, gzip, is_compressible_content_type, TranscodeOptions};
use crate::error::ProxyError;
use crate::metrics::{ConcurrencyCounters, MetricsSnapshot};
use crate::proxy::error_handler::error_response;
use crate::proxy::response_handler::{assemble_response, AssembledResponse};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// True when a request must bypass the cache entirely: any method other than
/// GET/HEAD, or a request URI containing one of the configured pass tokens.
pub fn should_pass(method: &Method, request_uri: &str, pass: &[String]) -> bool {
    if *method != Method::GET && *method != Method::HEAD {
        return true;
    }
    pass.iter()
        .any(|token| !token.is_empty() && request_uri.contains(token.as_str()))
}

/// Client address: first `X-Forwarded-For` element, else the socket peer
pub fn client_ip(headers: &HeaderMap, remote: Option<IpAddr>) -> Option<String> {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match forwarded {
        Some(ip) => Some(ip.to_string()),
        None => remote.map(|ip| ip.to_string()),
    }
}

// ============================================================================
// Admission
// ============================================================================

/// Why an upstream response was not stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionSkip {
    /// HEAD responses carry no body to serve later GETs or HEADs from
    HeadRequest,
    /// Cache-Control yields no lifetime (absent, zero, no-store, no-cache, private)
    NoLifetime,
    /// Body exceeds the per-entry limit
    TooLarge { size: usize, limit: u64 },
    /// Upstream encoding other than gzip/identity
    UnsupportedEncoding(String),
    /// Upstream claimed gzip but the body does not inflate
    CorruptBody(String),
}

/// Result of evaluating an upstream response for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Store(CacheEntry),
    Skip(AdmissionSkip),
}

/// Turn an upstream response into a storable entry.
///
/// The body is normalised before storing: upstream gzip is inflated, then
/// compressible bodies above the minimum length are stored gzip so hits for
/// gzip clients need no work. Length and encoding headers are never kept.
/// Only GET responses are stored.
pub fn admit_response(
    method: &Method,
    key: Fingerprint,
    upstream: &Response<Bytes>,
    config: &CacheConfig,
    now: u32,
) -> Admission {
    if *method == Method::HEAD {
        return Admission::Skip(AdmissionSkip::HeadRequest);
    }

    let headers = upstream.headers();
    let ttl = cache_ttl(headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok()));
    if ttl == 0 {
        return Admission::Skip(AdmissionSkip::NoLifetime);
    }

    let encoding = headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let raw = match encoding.as_str() {
        "" | "identity" => upstream.body().clone(),
        "gzip" | "x-gzip" => match gunzip(upstream.body(), config.max_decompressed_size) {
            Ok(raw) => Bytes::from(raw),
            Err(err) => return Admission::Skip(AdmissionSkip::CorruptBody(err.to_string())),
        },
        other => return Admission::Skip(AdmissionSkip::UnsupportedEncoding(other.to_string())),
    };

    if raw.len() as u64 > config.max_entry_size_bytes {
        return Admission::Skip(AdmissionSkip::TooLarge {
            size: raw.len(),
            limit: config.max_entry_size_bytes,
        });
    }

    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let (body, state) =
        if raw.len() > config.compress_min_length && is_compressible_content_type(content_type) {
            match gzip(&raw, config.gzip_level) {
                Ok(compressed) => (Bytes::from(compressed), CompressState::Gzip),
                Err(err) => {
                    tracing::debug!(key = %key, error = %err, "Store-time compression failed, storing raw");
                    (raw, CompressState::None)
                }
            }
        } else {
            (raw, CompressState::None)
        };

    let record = HeaderRecord::from_header_map(headers);
    let mut entry = CacheEntry::new(
        key,
        &record,
        body,
        state,
        upstream.status().as_u16(),
        ttl,
    );
    entry.created_at = now;
    Admission::Store(entry)
}

// ============================================================================
// Pipeline
// ============================================================================

/// Result of looking a request up in the store
#[derive(Debug)]
pub enum Lookup {
    /// Request bypasses the cache
    Pass,
    /// Nothing stored under this key
    Miss(Fingerprint),
    /// Served from the store
    Hit(AssembledResponse),
}

/// How a handled request was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Pass,
    Miss,
    Hit,
    Error,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Pass => "pass",
            CacheStatus::Miss => "miss",
            CacheStatus::Hit => "hit",
            CacheStatus::Error => "error",
        }
    }
}

/// Response to a handled request plus how it was produced
#[derive(Debug)]
pub struct Served {
    pub response: Response<Bytes>,
    pub status: CacheStatus,
}

/// Serving pipeline shared by all request tasks
pub struct CachePipeline {
    store: Arc<dyn CacheStore>,
    counters: Arc<ConcurrencyCounters>,
    config: CacheConfig,
    options: TranscodeOptions,
}

impl CachePipeline {
    pub fn new(
        store: Arc<dyn CacheStore>,
        counters: Arc<ConcurrencyCounters>,
        config: CacheConfig,
    ) -> Self {
        let options = TranscodeOptions::from(&config);
        Self {
            store,
            counters,
            config,
            options,
        }
    }

    pub fn counters(&self) -> &Arc<ConcurrencyCounters> {
        &self.counters
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Fingerprint a request with the configured key format
    pub fn fingerprint<B>(&self, request: &Request<B>) -> Fingerprint {
        Fingerprint::from_request(self.config.key_format, request)
    }

    /// Look a request up. Store failures degrade to a miss.
    pub async fn lookup<B>(&self, request: &Request<B>) -> Lookup {
        let uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        if should_pass(request.method(), uri, &self.config.pass) {
            return Lookup::Pass;
        }

        let key = self.fingerprint(request);
        let entry = match self.store.get(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Lookup::Miss(key),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Store lookup failed, treating as miss");
                return Lookup::Miss(key);
            }
        };

        Lookup::Hit(assemble_response(
            request.method(),
            request.headers(),
            &entry,
            now_seconds(),
            &self.options,
        ))
    }

    /// Evaluate an upstream response and store it when admissible.
    /// Returns the stored entry, or `None` when the response was skipped.
    pub async fn admit(
        &self,
        method: &Method,
        key: Fingerprint,
        upstream: &Response<Bytes>,
    ) -> Result<Option<CacheEntry>, StoreError> {
        match admit_response(method, key, upstream, &self.config, now_seconds()) {
            Admission::Store(entry) => {
                self.store.set(entry.clone()).await?;
                tracing::debug!(
                    key = %entry.key,
                    ttl = entry.ttl_seconds,
                    compress_state = ?entry.compress_state,
                    "Stored upstream response"
                );
                Ok(Some(entry))
            }
            Admission::Skip(reason) => {
                tracing::debug!(?reason, "Upstream response not stored");
                Ok(None)
            }
        }
    }

    /// Handle one request end to end.
    ///
    /// `fetch` is only called on pass or miss. The concurrency guard is held
    /// until this returns, whichever path is taken.
    pub async fn handle<B, F, Fut>(&self, request: &Request<B>, fetch: F) -> Served
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Response<Bytes>, ProxyError>>,
    {
        let _guard = self.counters.track();
        let remote = request.extensions().get::<SocketAddr>().map(|a| a.ip());
        let client = client_ip(request.headers(), remote).unwrap_or_default();

        let served = match self.lookup(request).await {
            Lookup::Hit(assembled) => Served {
                response: assembled.response,
                status: CacheStatus::Hit,
            },
            Lookup::Pass => match fetch().await {
                Ok(response) => Served {
                    response,
                    status: CacheStatus::Pass,
                },
                Err(err) => Self::failed(&err),
            },
            Lookup::Miss(key) => match fetch().await {
                Ok(upstream) => self.serve_miss(request, key, upstream).await,
                Err(err) => Self::failed(&err),
            },
        };

        tracing::info!(
            method = %request.method(),
            uri = %request.uri(),
            client_ip = %client,
            status = served.response.status().as_u16(),
            cache = served.status.as_str(),
            concurrency = self.counters.concurrency(),
            "Request served"
        );
        served
    }

    async fn serve_miss<B>(
        &self,
        request: &Request<B>,
        key: Fingerprint,
        upstream: Response<Bytes>,
    ) -> Served {
        let stored = match self.admit(request.method(), key, &upstream).await {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to store upstream response");
                None
            }
        };

        // Serve stored responses through the assembler so the encoding matches
        // what a later hit would send.
        let response = match stored {
            Some(entry) => {
                assemble_response(
                    request.method(),
                    request.headers(),
                    &entry,
                    now_seconds(),
                    &self.options,
                )
                .response
            }
            None => upstream,
        };
        Served {
            response,
            status: CacheStatus::Miss,
        }
    }

    fn failed(err: &ProxyError) -> Served {
        Served {
            response: error_response(err),
            status: CacheStatus::Error,
        }
    }

    /// Counters combined with the store's statistics
    pub async fn metrics(&self) -> Result<MetricsSnapshot, StoreError> {
        self.counters.snapshot_from(self.store.as_ref()).await
    }
}
