// Header record unit tests

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue};
use hayabusa::cache::HeaderRecord;

#[test]
fn test_parse_crlf_lines() {
    let raw = Bytes::from_static(b"Content-Type: text/html\r\nX: \r\n");
    let record = HeaderRecord::parse(&raw);
    assert_eq!(record.len(), 2);
    assert_eq!(record.get("content-type"), Some(&b"text/html"[..]));
    assert_eq!(record.get("x"), Some(&b""[..]));
}

#[test]
fn test_parse_skips_lines_without_colon() {
    let raw = Bytes::from_static(b"HTTP/1.1 200 OK\r\nETag: \"1\"\r\n\r\n");
    let record = HeaderRecord::parse(&raw);
    assert_eq!(record.len(), 1);
    assert_eq!(record.get("etag"), Some(&b"\"1\""[..]));
}

#[test]
fn test_only_one_space_stripped() {
    let record = HeaderRecord::parse(&Bytes::from_static(b"X-Pad:  two\n"));
    assert_eq!(record.get("x-pad"), Some(&b" two"[..]));
}

#[test]
fn test_captured_record_never_keeps_length_or_encoding() {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("text/css"));
    headers.insert("content-length", HeaderValue::from_static("42"));
    headers.insert("content-encoding", HeaderValue::from_static("gzip"));

    let blob = HeaderRecord::from_header_map(&headers).to_bytes();
    let reparsed = HeaderRecord::parse(&blob);
    assert_eq!(reparsed.len(), 1);
    assert_eq!(reparsed.get("Content-Type"), Some(&b"text/css"[..]));
}

#[test]
fn test_apply_to_skips_derived_fields() {
    let raw = Bytes::from_static(b"Content-Length: 10\r\nCache-Control: max-age=5\r\n");
    let record = HeaderRecord::parse(&raw);
    let mut headers = HeaderMap::new();
    record.apply_to(&mut headers);
    assert!(headers.get("content-length").is_none());
    assert_eq!(headers["cache-control"], "max-age=5");
}
