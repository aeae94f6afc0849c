// Cache-Control evaluation and fingerprint unit tests

use hayabusa::cache::{cache_ttl, CacheControl, Fingerprint, KeyFormat};
use rstest::rstest;

#[rstest]
#[case(None, 0)]
#[case(Some(""), 0)]
#[case(Some("public"), 0)]
#[case(Some("max-age=60"), 60)]
#[case(Some("public, max-age=300"), 300)]
#[case(Some("s-maxage=120, max-age=60"), 120)]
#[case(Some("max-age=60, s-maxage=120"), 120)]
#[case(Some("no-store, max-age=60"), 0)]
#[case(Some("no-cache, s-maxage=60"), 0)]
#[case(Some("private, max-age=60"), 0)]
#[case(Some("MAX-AGE=45"), 45)]
#[case(Some("max-age=\"30\""), 30)]
#[case(Some("max-age=abc"), 0)]
#[case(Some("max-age=-5"), 0)]
fn test_cache_ttl(#[case] header: Option<&str>, #[case] expected: u32) {
    assert_eq!(cache_ttl(header), expected);
}

#[test]
fn test_overflowing_max_age_saturates() {
    assert_eq!(cache_ttl(Some("max-age=99999999999999999999999")), u32::MAX);
}

#[test]
fn test_parse_exposes_directives() {
    let cc = CacheControl::parse("public, s-maxage=10, max-age=5");
    assert_eq!(cc.s_maxage, Some(10));
    assert_eq!(cc.max_age, Some(5));
    assert!(!cc.forbids_storage());
    assert_eq!(cc.ttl_seconds(), 10);
}

#[test]
fn test_fingerprint_same_inputs_same_key() {
    let a = Fingerprint::new(b"GET", b"example.com", b"/a?b=1");
    let b = Fingerprint::new(b"GET", b"example.com", b"/a?b=1");
    assert_eq!(a, b);
    assert_ne!(a, Fingerprint::new(b"HEAD", b"example.com", b"/a?b=1"));
}

#[test]
fn test_length_prefixed_keys_do_not_collide() {
    let a = Fingerprint::with_format(KeyFormat::LengthPrefixed, b"GET", b"Ax", b"/");
    let b = Fingerprint::with_format(KeyFormat::LengthPrefixed, b"GETA", b"x", b"/");
    assert_ne!(a, b);

    // Concat keeps the stored key layout and therefore its collision
    let a = Fingerprint::with_format(KeyFormat::Concat, b"GET", b"Ax", b"/");
    let b = Fingerprint::with_format(KeyFormat::Concat, b"GETA", b"x", b"/");
    assert_eq!(a, b);
}

#[test]
fn test_fingerprint_from_request() {
    let request = http::Request::builder()
        .uri("http://origin.internal/list?page=2")
        .header("host", "example.com")
        .body(())
        .unwrap();
    let key = Fingerprint::from_request(KeyFormat::Concat, &request);
    assert_eq!(key.as_bytes(), b"GETexample.com/list?page=2");
}
