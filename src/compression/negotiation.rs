/// Accept-Encoding header parsing
use http::header::{HeaderMap, ACCEPT_ENCODING};

/// Represents a single encoding in Accept-Encoding header with quality value
#[derive(Debug, Clone, PartialEq)]
struct EncodingPreference {
    encoding: String,
    quality: f32,
}

impl EncodingPreference {
    /// Parse a single encoding preference (e.g., "gzip;q=0.8")
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let mut parts = s.split(';');
        let encoding = parts.next()?.trim().to_ascii_lowercase();

        let mut quality = 1.0;
        for param in parts {
            if let Some(q_value) = param.trim().strip_prefix("q=") {
                quality = q_value.trim().parse::<f32>().unwrap_or(1.0);
            }
        }

        Some(EncodingPreference { encoding, quality })
    }
}

/// Whether an Accept-Encoding value admits gzip.
///
/// `gzip` (or `x-gzip`) with a non-zero q-value accepts; an explicit
/// `gzip;q=0` refuses even when `*` is also listed; `*` with a non-zero
/// q-value accepts anything not explicitly refused.
pub fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    let Some(accept_encoding) = accept_encoding else {
        return false;
    };

    let mut explicit: Option<f32> = None;
    let mut wildcard: Option<f32> = None;

    for pref in accept_encoding.split(',').filter_map(EncodingPreference::parse) {
        match pref.encoding.as_str() {
            "gzip" | "x-gzip" => explicit = Some(explicit.map_or(pref.quality, |q| q.max(pref.quality))),
            "*" => wildcard = Some(pref.quality),
            _ => {}
        }
    }

    match (explicit, wildcard) {
        (Some(q), _) => q > 0.0,
        (None, Some(q)) => q > 0.0,
        (None, None) => false,
    }
}

/// `accepts_gzip` over every Accept-Encoding line of a request
pub fn request_accepts_gzip(headers: &HeaderMap) -> bool {
    let values: Vec<&str> = headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        return false;
    }
    accepts_gzip(Some(&values.join(",")))
}
