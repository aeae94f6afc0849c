//! Compression module
//!
//! Adaptive gzip transcoding of cached bodies:
//! - [`compress`] - gzip encode/decode with a decompression size bound
//! - [`negotiation`] - Accept-Encoding parsing
//! - [`response`] - the serve-time decision table and its outcome types
//! - [`error`] - error types

pub mod compress;
pub mod error;
pub mod negotiation;
pub mod response;

pub use compress::{gunzip, gzip, looks_like_gzip};
pub use error::CompressionError;
pub use negotiation::{accepts_gzip, request_accepts_gzip};
pub use response::{
    add_vary_accept_encoding, is_compressible_content_type, transcode, SkipReason,
    TranscodeOptions, TranscodeOutcome, Transcoded,
};
