// Hayabusa caching proxy core
// Cache keys and lifetimes, stored response assembly, conditional requests,
// gzip transcoding and request counters.

pub mod cache;
pub mod compression;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod proxy;
