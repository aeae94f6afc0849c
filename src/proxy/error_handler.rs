//! Error handler module for the proxy.
//!
//! Turns a [`ProxyError`] into a complete response: status code from the
//! error kind, `Cache-Control: no-cache` so the error is never stored by this
//! or any downstream cache, and the error description as a plain-text body.

use bytes::Bytes;
use http::header::{HeaderValue, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use http::{Response, StatusCode};

use crate::error::ProxyError;

/// Content type of error bodies
pub const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Build the response for an error. Total over every error kind.
pub fn error_response(err: &ProxyError) -> Response<Bytes> {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.as_u16() >= 500 && status != StatusCode::SERVICE_UNAVAILABLE {
        tracing::error!(status = status.as_u16(), error = %err, "Request failed");
    } else {
        tracing::warn!(status = status.as_u16(), error = %err, "Request failed");
    }

    let body = Bytes::from(err.to_string());
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(ERROR_CONTENT_TYPE));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

    *response.body_mut() = body;
    response
}

// ============================================================================
// Tests
// ============================================================================
