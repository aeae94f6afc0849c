// End-to-end serving: miss, store, hit with transcoding

use bytes::Bytes;
use hayabusa::cache::{CacheStore, CompressState};
use hayabusa::compression::gunzip;
use hayabusa::error::ProxyError;
use hayabusa::pipeline::CacheStatus;
use http::{Method, Response, StatusCode};

use super::test_harness::{cacheable_html, harness, html_body, request};

#[tokio::test]
async fn test_hit_is_gzip_for_gzip_client_and_plain_otherwise() {
    let h = harness();
    let uri = "/articles/42";

    let miss = h
        .pipeline
        .handle(&request(Method::GET, uri, &[]), || async { Ok(cacheable_html()) })
        .await;
    assert_eq!(miss.status, CacheStatus::Miss);

    let key = h.pipeline.fingerprint(&request(Method::GET, uri, &[]));
    let stored = h.store.get(&key).await.unwrap().expect("entry stored");
    assert_eq!(stored.compress_state, CompressState::Gzip);
    assert_eq!(stored.ttl_seconds, 300);

    let gzip_hit = h
        .pipeline
        .handle(
            &request(Method::GET, uri, &[("accept-encoding", "gzip, deflate")]),
            || async { Err(ProxyError::Internal("upstream must not be called".to_string())) },
        )
        .await;
    assert_eq!(gzip_hit.status, CacheStatus::Hit);
    assert_eq!(gzip_hit.response.headers()["content-encoding"], "gzip");
    assert_eq!(
        gunzip(gzip_hit.response.body(), 1 << 20).unwrap(),
        html_body()
    );

    let plain_hit = h
        .pipeline
        .handle(&request(Method::GET, uri, &[]), || async {
            Err(ProxyError::Internal("upstream must not be called".to_string()))
        })
        .await;
    assert_eq!(plain_hit.status, CacheStatus::Hit);
    assert!(plain_hit.response.headers().get("content-encoding").is_none());
    assert_eq!(plain_hit.response.body(), &html_body());
    assert_eq!(
        plain_hit.response.headers()["content-length"],
        html_body().len().to_string().as_str()
    );
    assert!(plain_hit.response.headers().get("age").is_some());
}

#[tokio::test]
async fn test_uncacheable_response_is_relayed_and_not_stored() {
    let h = harness();
    let upstream = || async {
        Ok(Response::builder()
            .status(200)
            .header("cache-control", "private, max-age=60")
            .header("content-type", "application/json")
            .body(Bytes::from_static(b"{\"user\":\"me\"}"))
            .unwrap())
    };

    let served = h
        .pipeline
        .handle(&request(Method::GET, "/me", &[]), upstream)
        .await;
    assert_eq!(served.status, CacheStatus::Miss);
    assert_eq!(served.response.body().as_ref(), b"{\"user\":\"me\"}");

    let again = h
        .pipeline
        .handle(&request(Method::GET, "/me", &[]), upstream)
        .await;
    assert_eq!(again.status, CacheStatus::Miss);
}

/// Upstream HEAD answer: full headers, no body
fn head_upstream() -> Response<Bytes> {
    Response::builder()
        .status(200)
        .header("content-type", "text/html; charset=utf-8")
        .header("cache-control", "public, max-age=300")
        .header("content-length", "3200")
        .body(Bytes::new())
        .unwrap()
}

#[tokio::test]
async fn test_head_miss_keeps_upstream_length_and_is_not_stored() {
    let h = harness();
    for _ in 0..2 {
        let head = h
            .pipeline
            .handle(&request(Method::HEAD, "/page", &[]), || async {
                Ok(head_upstream())
            })
            .await;
        assert_eq!(head.status, CacheStatus::Miss);
        assert_eq!(head.response.status(), StatusCode::OK);
        assert!(head.response.body().is_empty());
        assert_eq!(head.response.headers()["content-length"], "3200");
    }

    let key = h.pipeline.fingerprint(&request(Method::HEAD, "/page", &[]));
    assert!(h.store.get(&key).await.unwrap().is_none());
    assert_eq!(h.store.stats().await.unwrap().sets, 0);
}

#[tokio::test]
async fn test_pass_token_bypasses_store() {
    let mut config = hayabusa::cache::CacheConfig::default();
    config.pass = vec!["nocache=1".to_string()];
    let h = super::test_harness::harness_with(config);

    let served = h
        .pipeline
        .handle(&request(Method::GET, "/feed?nocache=1", &[]), || async {
            Ok(cacheable_html())
        })
        .await;
    assert_eq!(served.status, CacheStatus::Pass);

    let stats = h.store.stats().await.unwrap();
    assert_eq!(stats.sets, 0);
    assert_eq!(stats.misses, 0);
}

#[tokio::test]
async fn test_upstream_failure_is_503_and_not_cached() {
    let h = harness();
    let served = h
        .pipeline
        .handle(&request(Method::GET, "/down", &[]), || async {
            Err(ProxyError::UpstreamUnavailable("no healthy backend".to_string()))
        })
        .await;
    assert_eq!(served.status, CacheStatus::Error);
    assert_eq!(served.response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(served.response.headers()["cache-control"], "no-cache");
    assert_eq!(h.store.stats().await.unwrap().sets, 0);
}
