// Metrics snapshot integration tests

use hayabusa::metrics::SNAPSHOT_METRIC_COUNT;
use http::Method;

use super::test_harness::{cacheable_html, harness, request};

#[tokio::test]
async fn test_snapshot_reflects_traffic() {
    let h = harness();
    for _ in 0..3 {
        h.pipeline
            .handle(&request(Method::GET, "/a", &[]), || async { Ok(cacheable_html()) })
            .await;
    }
    h.store.run_pending_tasks().await;

    let snapshot = h.pipeline.metrics().await.unwrap();
    assert_eq!(snapshot.entries().len(), SNAPSHOT_METRIC_COUNT);
    assert_eq!(snapshot.get("concurrency"), Some(0));
    assert_eq!(snapshot.get("request_count"), Some(3));
    assert_eq!(snapshot.get("store_sets"), Some(1));
    assert_eq!(snapshot.get("store_misses"), Some(1));
    assert_eq!(snapshot.get("store_hits"), Some(2));
    assert_eq!(snapshot.get("store_entry_count"), Some(1));
    assert_eq!(snapshot.get("store_gzip_entries"), Some(1));
}

#[tokio::test]
async fn test_snapshot_serializes_to_json() {
    let h = harness();
    let snapshot = h.pipeline.metrics().await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["concurrency"], 0);
    assert_eq!(json["store"]["hits"], 0);
}

#[tokio::test]
async fn test_prometheus_export_lists_every_metric() {
    let h = harness();
    let text = h.pipeline.metrics().await.unwrap().export_prometheus();
    let samples = text
        .lines()
        .filter(|l| !l.starts_with('#') && !l.is_empty())
        .count();
    // every named value plus the derived hit rate
    assert_eq!(samples, SNAPSHOT_METRIC_COUNT + 1);
}
