// Shared helpers for integration tests: pipeline construction and canned
// upstream responses.

use std::sync::Arc;

use bytes::Bytes;
use hayabusa::cache::{CacheConfig, CacheStore, MemoryStore};
use hayabusa::metrics::ConcurrencyCounters;
use hayabusa::pipeline::CachePipeline;
use http::{Method, Request, Response};

pub const LAST_MODIFIED: &str = "Wed, 21 Oct 2015 07:28:00 GMT";

pub struct Harness {
    pub pipeline: CachePipeline,
    pub store: Arc<MemoryStore>,
    pub counters: Arc<ConcurrencyCounters>,
}

pub fn harness() -> Harness {
    harness_with(CacheConfig::default())
}

pub fn harness_with(config: CacheConfig) -> Harness {
    let store = Arc::new(MemoryStore::new(&config));
    let counters = Arc::new(ConcurrencyCounters::new());
    let dyn_store: Arc<dyn CacheStore> = store.clone();
    Harness {
        pipeline: CachePipeline::new(dyn_store, Arc::clone(&counters), config),
        store,
        counters,
    }
}

pub fn html_body() -> Bytes {
    Bytes::from("<article>hayabusa cached article body</article>\n".repeat(64))
}

/// Cacheable 200 with validators
pub fn cacheable_html() -> Response<Bytes> {
    let body = html_body();
    Response::builder()
        .status(200)
        .header("content-type", "text/html; charset=utf-8")
        .header("cache-control", "public, max-age=300")
        .header("etag", "\"article-v1\"")
        .header("last-modified", LAST_MODIFIED)
        .header("content-length", body.len())
        .body(body)
        .unwrap()
}

pub fn request(method: Method, uri: &str, headers: &[(&str, &str)]) -> Request<()> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "news.example.com");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap()
}
