// Conditional requests against stored entries

use hayabusa::error::ProxyError;
use hayabusa::pipeline::CacheStatus;
use http::{Method, StatusCode};

use super::test_harness::{cacheable_html, harness, html_body, request, Harness};

async fn primed() -> Harness {
    let h = harness();
    h.pipeline
        .handle(&request(Method::GET, "/doc", &[]), || async { Ok(cacheable_html()) })
        .await;
    h
}

async fn conditional(h: &Harness, headers: &[(&str, &str)]) -> hayabusa::pipeline::Served {
    h.pipeline
        .handle(&request(Method::GET, "/doc", headers), || async {
            Err(ProxyError::Internal("upstream must not be called".to_string()))
        })
        .await
}

#[tokio::test]
async fn test_matching_etag_is_304_without_body() {
    let h = primed().await;
    let served = conditional(&h, &[("if-none-match", "\"article-v1\"")]).await;
    assert_eq!(served.status, CacheStatus::Hit);
    assert_eq!(served.response.status(), StatusCode::NOT_MODIFIED);
    assert!(served.response.body().is_empty());
}

#[tokio::test]
async fn test_stale_etag_gets_full_body() {
    let h = primed().await;
    let served = conditional(&h, &[("if-none-match", "\"article-v0\"")]).await;
    assert_eq!(served.response.status(), StatusCode::OK);
    assert_eq!(served.response.body(), &html_body());
}

#[tokio::test]
async fn test_modified_since_before_last_modified_gets_full_body() {
    let h = primed().await;
    let served = conditional(&h, &[("if-modified-since", "Tue, 20 Oct 2015 07:28:00 GMT")]).await;
    assert_eq!(served.response.status(), StatusCode::OK);
    assert_eq!(served.response.body(), &html_body());
}

#[tokio::test]
async fn test_modified_since_after_last_modified_is_304() {
    let h = primed().await;
    let served = conditional(&h, &[("if-modified-since", "Thu, 22 Oct 2015 07:28:00 GMT")]).await;
    assert_eq!(served.response.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn test_client_no_cache_forces_full_body() {
    let h = primed().await;
    let served = conditional(
        &h,
        &[("if-none-match", "\"article-v1\""), ("cache-control", "no-cache")],
    )
    .await;
    assert_eq!(served.response.status(), StatusCode::OK);
}
