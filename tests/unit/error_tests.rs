// Error mapping unit tests

use hayabusa::cache::StoreError;
use hayabusa::compression::CompressionError;
use hayabusa::error::ProxyError;
use hayabusa::proxy::error_response;
use http::StatusCode;

#[test]
fn test_unavailable_kinds_map_to_503_no_cache() {
    for err in [
        ProxyError::UpstreamUnavailable("dial tcp: refused".to_string()),
        ProxyError::ServiceUnavailable("too many requests in flight".to_string()),
    ] {
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()["cache-control"], "no-cache");
    }
}

#[test]
fn test_internal_maps_to_500_no_cache() {
    let response = error_response(&ProxyError::Internal("boom".to_string()));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()["cache-control"], "no-cache");
    assert_eq!(response.body().as_ref(), b"Internal error: boom");
}

#[test]
fn test_conversions() {
    let err: ProxyError = CompressionError::DecompressionFailed("bad header".to_string()).into();
    assert_eq!(err.status_code(), 500);

    let err: ProxyError = StoreError::Unavailable("redis down".to_string()).into();
    assert_eq!(err.status_code(), 503);

    let err: ProxyError = StoreError::NotCacheable.into();
    assert_eq!(err.status_code(), 500);
}
