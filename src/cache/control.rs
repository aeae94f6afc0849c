//! Cache-Control evaluation for upstream responses.
//!
//! Decides whether a response fetched on a cache miss may be stored by this
//! proxy, and for how long. The rules, in priority order:
//!
//! 1. An empty or missing header is not cacheable (TTL 0).
//! 2. `no-cache`, `no-store` or `private` anywhere in the header means TTL 0,
//!    even when an explicit `max-age` or `s-maxage` is present.
//! 3. `s-maxage=N` gives TTL N (shared-cache lifetime wins).
//! 4. `max-age=N` gives TTL N.
//! 5. Anything else is not cacheable.
//!
//! Malformed numbers never raise an error; the directive is simply ignored.
//!
//! # Example
//!
//! ```rust
//! use hayabusa::cache::CacheControl;
//!
//! let cc = CacheControl::parse("public, s-maxage=120, max-age=60");
//! assert_eq!(cc.ttl_seconds(), 120);
//!
//! let cc = CacheControl::parse("private, max-age=3600");
//! assert_eq!(cc.ttl_seconds(), 0);
//! ```

/// Parsed Cache-Control header directives.
///
/// Only the directives that affect whether and how long a shared cache may
/// store a response are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    /// Maximum age in seconds (max-age directive)
    pub max_age: Option<u32>,

    /// Shared cache maximum age in seconds (s-maxage directive)
    pub s_maxage: Option<u32>,

    /// Response must not be stored in any cache (no-store directive)
    pub no_store: bool,

    /// Response must be revalidated before use (no-cache directive)
    pub no_cache: bool,

    /// Response is intended for a single user (private directive)
    pub private: bool,
}

impl CacheControl {
    /// Parse a Cache-Control header value into structured directives.
    ///
    /// Directives are comma separated and case-insensitive. Values may be
    /// quoted. Unknown directives are ignored. When a numeric directive is
    /// repeated, the first well-formed occurrence wins.
    pub fn parse(header_value: &str) -> Self {
        let mut result = Self::default();

        for directive in header_value.split(',') {
            let directive = directive.trim().to_ascii_lowercase();
            if directive.is_empty() {
                continue;
            }

            if let Some((name, value)) = directive.split_once('=') {
                let value = value.trim().trim_matches('"');

                match name.trim() {
                    "max-age" => {
                        if result.max_age.is_none() {
                            result.max_age = parse_seconds(value);
                        }
                    }
                    "s-maxage" => {
                        if result.s_maxage.is_none() {
                            result.s_maxage = parse_seconds(value);
                        }
                    }
                    // Field-qualified forms (no-cache="Set-Cookie") still forbid caching
                    "no-cache" => result.no_cache = true,
                    "private" => result.private = true,
                    _ => {}
                }
            } else {
                match directive.as_str() {
                    "no-store" => result.no_store = true,
                    "no-cache" => result.no_cache = true,
                    "private" => result.private = true,
                    _ => {}
                }
            }
        }

        result
    }

    /// True when any directive forbids this proxy from storing the response.
    pub fn forbids_storage(&self) -> bool {
        self.no_store || self.no_cache || self.private
    }

    /// Time-to-live in seconds for a shared cache. 0 means do not cache.
    pub fn ttl_seconds(&self) -> u32 {
        if self.forbids_storage() {
            return 0;
        }
        self.s_maxage.or(self.max_age).unwrap_or(0)
    }
}

/// Parse a delta-seconds value, saturating at `u32::MAX`.
fn parse_seconds(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match value.parse::<u64>() {
        Ok(secs) => Some(u32::try_from(secs).unwrap_or(u32::MAX)),
        // Too many digits for u64 is still a valid, very large lifetime
        Err(_) => Some(u32::MAX),
    }
}

/// Derive the TTL for an optional Cache-Control header value.
///
/// A missing header behaves like an empty one.
pub fn cache_ttl(header_value: Option<&str>) -> u32 {
    match header_value {
        Some(value) if !value.trim().is_empty() => CacheControl::parse(value).ttl_seconds(),
        _ => 0,
    }
}
