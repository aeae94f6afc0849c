//! Cache key derivation
//!
//! A fingerprint identifies one cacheable response: request method, host and
//! request URI (path + query). Store and lookup must feed identical inputs
//! (same host casing, same query order) or they silently miss.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

/// How the three key fields are laid out in the key bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFormat {
    /// `method + host + uri` with no separator.
    ///
    /// Compatible with keys already persisted by existing stores. Distinct
    /// triples can collide ("GET"+"Ax" and "GETA"+"x").
    #[default]
    Concat,
    /// Each field preceded by its length as a 4-byte big-endian integer.
    ///
    /// Unambiguous, but not readable by stores populated with `Concat` keys.
    LengthPrefixed,
}

/// Byte-string cache key
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(Bytes);

impl Fingerprint {
    /// Build the key for a request using the compatible `Concat` format.
    pub fn new(method: &[u8], host: &[u8], request_uri: &[u8]) -> Self {
        Self::with_format(KeyFormat::Concat, method, host, request_uri)
    }

    /// Build the key for a request using an explicit key format.
    pub fn with_format(format: KeyFormat, method: &[u8], host: &[u8], request_uri: &[u8]) -> Self {
        let fields = [method, host, request_uri];
        let payload: usize = fields.iter().map(|f| f.len()).sum();

        let buf = match format {
            KeyFormat::Concat => {
                let mut buf = BytesMut::with_capacity(payload);
                for field in fields {
                    buf.put_slice(field);
                }
                buf
            }
            KeyFormat::LengthPrefixed => {
                let mut buf = BytesMut::with_capacity(payload + 4 * fields.len());
                for field in fields {
                    // Request lines longer than 4 GiB never reach this far
                    buf.put_u32(field.len() as u32);
                    buf.put_slice(field);
                }
                buf
            }
        };

        Fingerprint(buf.freeze())
    }

    /// Build the key from an `http` request, using its `Host` header when
    /// present and the URI authority otherwise.
    pub fn from_request<B>(format: KeyFormat, request: &http::Request<B>) -> Self {
        let host = request
            .headers()
            .get(http::header::HOST)
            .map(|v| v.as_bytes())
            .or_else(|| request.uri().host().map(str::as_bytes))
            .unwrap_or_default();
        let request_uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        Self::with_format(
            format,
            request.method().as_str().as_bytes(),
            host,
            request_uri.as_bytes(),
        )
    }

    /// Raw key bytes as handed to the store
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Bytes> for Fingerprint {
    fn from(bytes: Bytes) -> Self {
        Fingerprint(bytes)
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
