// Concurrent request handling
//
// Many simultaneous requests through one pipeline:
// - the in-flight counter returns to zero
// - every request is counted exactly once

use std::sync::Arc;

use hayabusa::error::ProxyError;
use hayabusa::metrics::ConcurrencyCounters;
use http::Method;
use tokio::task::JoinSet;

use super::test_harness::{cacheable_html, harness, request};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_counters_balanced_under_load() {
    let h = Arc::new(harness());
    let mut tasks = JoinSet::new();

    for i in 0..200 {
        let h = Arc::clone(&h);
        tasks.spawn(async move {
            let uri = format!("/item/{}", i % 10);
            let req = request(Method::GET, &uri, &[]);
            if i % 7 == 0 {
                h.pipeline
                    .handle(&req, || async {
                        Err(ProxyError::ServiceUnavailable("shed".to_string()))
                    })
                    .await
            } else {
                h.pipeline
                    .handle(&req, || async {
                        tokio::task::yield_now().await;
                        Ok(cacheable_html())
                    })
                    .await
            }
        });
    }

    while let Some(result) = tasks.join_next().await {
        result.expect("task panicked");
    }

    assert_eq!(h.counters.concurrency(), 0);
    assert_eq!(h.counters.request_count(), 200);
}

#[tokio::test]
async fn test_in_flight_visible_while_handling() {
    let h = harness();
    let counters = Arc::clone(&h.counters);
    let served = h
        .pipeline
        .handle(&request(Method::GET, "/slow", &[]), || async move {
            assert_eq!(counters.concurrency(), 1);
            Ok(cacheable_html())
        })
        .await;
    assert_eq!(served.response.status(), 200);
    assert_eq!(h.counters.concurrency(), 0);
}

#[test]
fn test_independent_counter_instances() {
    let a = ConcurrencyCounters::new();
    let b = ConcurrencyCounters::new();
    assert_eq!(a.increase_concurrency(), 1);
    assert_eq!(a.concurrency(), 1);
    assert_eq!(b.concurrency(), 0);
    assert_eq!(a.decrease_concurrency(), 0);
    assert_eq!(a.concurrency(), 0);
    assert_eq!(a.decrease_concurrency(), 0);
}
