//! Conditional request evaluation (If-None-Match / If-Modified-Since).
//!
//! Decides whether the client's own copy is still current so a cached
//! response can be answered with 304 Not Modified.
//!
//! Rules:
//! - only GET/HEAD against a stored status in 200..300 or 304 qualify
//! - without either validator the full response is served
//! - `Cache-Control: no-cache` on the request forces a full response
//! - `If-None-Match` is decisive when present (`*` matches any stored
//!   response; otherwise a weak ETag comparison); `If-Modified-Since` is then
//!   ignored
//! - otherwise `If-Modified-Since` matches when the stored Last-Modified is
//!   not newer than it

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use http::header::{
    HeaderMap, CACHE_CONTROL, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use http::Method;

/// Result of conditional request validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalResult {
    /// If-None-Match matched the stored ETag - return 304.
    NotModifiedByEtag,
    /// Stored Last-Modified is not newer than If-Modified-Since - return 304.
    NotModifiedByDate,
    /// Validators present but the stored response is different.
    Modified,
    /// The request carries no validator.
    NoValidators,
    /// The client asked for an end-to-end reload (Cache-Control: no-cache).
    RefreshRequested,
    /// Method or stored status never produces a 304.
    NotApplicable,
}

impl ConditionalResult {
    /// True when the response should be 304 Not Modified
    pub fn is_fresh(&self) -> bool {
        matches!(
            self,
            ConditionalResult::NotModifiedByEtag | ConditionalResult::NotModifiedByDate
        )
    }
}

/// Whether a method/status pair is eligible for a 304 at all
pub fn is_conditional_candidate(method: &Method, status: u16) -> bool {
    (*method == Method::GET || *method == Method::HEAD)
        && ((200..300).contains(&status) || status == 304)
}

/// Evaluate conditional headers for a stored response.
///
/// # Arguments
///
/// * `method` - Request method.
/// * `status` - Stored response status.
/// * `request` - Request headers (validators, Cache-Control).
/// * `response` - Reconstructed stored response headers (ETag, Last-Modified).
pub fn evaluate(
    method: &Method,
    status: u16,
    request: &HeaderMap,
    response: &HeaderMap,
) -> ConditionalResult {
    if !is_conditional_candidate(method, status) {
        return ConditionalResult::NotApplicable;
    }

    let if_none_match = header_str(request, IF_NONE_MATCH.as_str());
    let if_modified_since = header_str(request, IF_MODIFIED_SINCE.as_str());

    if if_none_match.is_none() && if_modified_since.is_none() {
        return ConditionalResult::NoValidators;
    }

    if request
        .get_all(CACHE_CONTROL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(has_no_cache_directive)
    {
        return ConditionalResult::RefreshRequested;
    }

    if let Some(if_none_match) = if_none_match {
        let etag = header_str(response, ETAG.as_str());
        return if etag_matches(if_none_match, etag) {
            ConditionalResult::NotModifiedByEtag
        } else {
            ConditionalResult::Modified
        };
    }

    if let Some(if_modified_since) = if_modified_since {
        let last_modified = header_str(response, LAST_MODIFIED.as_str());
        if let Some(last_modified) = last_modified {
            if not_modified_since(last_modified, if_modified_since) {
                return ConditionalResult::NotModifiedByDate;
            }
        }
    }

    ConditionalResult::Modified
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn has_no_cache_directive(value: &str) -> bool {
    value.split(',').any(|directive| {
        directive
            .split('=')
            .next()
            .map(|name| name.trim().eq_ignore_ascii_case("no-cache"))
            .unwrap_or(false)
    })
}

/// Weak comparison: `W/"x"` and `"x"` are equal.
fn weak_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Whether any entity tag in an If-None-Match list matches the stored ETag
fn etag_matches(if_none_match: &str, etag: Option<&str>) -> bool {
    if if_none_match.trim() == "*" {
        return true;
    }
    let Some(etag) = etag else {
        return false;
    };
    let stored = weak_tag(etag);
    if_none_match
        .split(',')
        .map(weak_tag)
        .any(|candidate| !candidate.is_empty() && candidate == stored)
}

/// Obsolete HTTP-date layouts recipients must still accept: RFC 850
/// (`Sunday, 06-Nov-94 08:49:37 GMT`) and asctime (`Sun Nov  6 08:49:37 1994`)
const LEGACY_DATE_FORMATS: [&str; 2] = ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];

/// Parse an HTTP-date. IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`) is
/// tried first, then the legacy layouts, which are always UTC.
pub fn parse_http_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date);
    }
    LEGACY_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// True when Last-Modified <= If-Modified-Since; unparseable dates never match
fn not_modified_since(last_modified: &str, if_modified_since: &str) -> bool {
    match (
        parse_http_date(last_modified),
        parse_http_date(if_modified_since),
    ) {
        (Some(modified), Some(since)) => modified <= since,
        _ => false,
    }
}
