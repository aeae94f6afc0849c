//! Wire-form header record
//!
//! Stored responses keep their headers as a raw blob of `Name: Value` lines.
//! The blob is the persisted representation shared with the store; this
//! module is the only place that reads or writes it.
//!
//! Format:
//! - one field per line, lines terminated by `\n`
//! - a `\r` immediately before the terminator is not part of the value
//! - lines without a colon are ignored (status lines, blank lines)
//! - exactly one space after the colon is stripped, if present
//!
//! `Content-Length` and `Content-Encoding` are never written: the body may be
//! transcoded between storage and delivery, so both are derived at serve time.

use bytes::{BufMut, Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH};

/// A single `Name: Value` field as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub name: Bytes,
    pub value: Bytes,
}

impl HeaderField {
    /// True for the fields that are recomputed on every serve
    fn is_derived(&self) -> bool {
        self.name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str().as_bytes())
            || self.name.eq_ignore_ascii_case(CONTENT_ENCODING.as_str().as_bytes())
    }
}

/// Ordered list of header fields with a serialize/parse pair for the blob form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRecord {
    fields: Vec<HeaderField>,
}

impl HeaderRecord {
    /// Parse a raw header blob. Never fails; malformed lines are skipped.
    /// Field names and values are slices of `raw`, so nothing is copied.
    pub fn parse(raw: &Bytes) -> Self {
        let mut fields = Vec::new();

        let mut start = 0;
        while start < raw.len() {
            let end = raw[start..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|pos| start + pos)
                .unwrap_or(raw.len());
            let mut line_end = end;
            if line_end > start && raw[line_end - 1] == b'\r' {
                line_end -= 1;
            }

            let line = &raw[start..line_end];
            if let Some(colon) = line.iter().position(|b| *b == b':') {
                let mut value_start = start + colon + 1;
                if value_start < line_end && raw[value_start] == b' ' {
                    value_start += 1;
                }
                fields.push(HeaderField {
                    name: raw.slice(start..start + colon),
                    value: raw.slice(value_start..line_end),
                });
            }

            start = end + 1;
        }

        Self { fields }
    }

    /// Capture the persistable headers of an upstream response.
    ///
    /// `Content-Length` and `Content-Encoding` are dropped.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let fields = headers
            .iter()
            .filter(|(name, _)| **name != CONTENT_LENGTH && **name != CONTENT_ENCODING)
            .map(|(name, value)| HeaderField {
                name: Bytes::from(canonical_name(name.as_str())),
                value: Bytes::copy_from_slice(value.as_bytes()),
            })
            .collect();
        Self { fields }
    }

    /// Serialize to the blob form, one `Name: Value\r\n` line per field.
    pub fn to_bytes(&self) -> Bytes {
        let size: usize = self
            .fields
            .iter()
            .map(|f| f.name.len() + f.value.len() + 4)
            .sum();
        let mut buf = BytesMut::with_capacity(size);
        for field in self.fields.iter().filter(|f| !f.is_derived()) {
            buf.put_slice(&field.name);
            buf.put_slice(b": ");
            buf.put_slice(&field.value);
            buf.put_slice(b"\r\n");
        }
        buf.freeze()
    }

    /// Append every field to an outgoing header map.
    ///
    /// Repeated names (Set-Cookie, Vary) are appended, not replaced. Fields
    /// whose name or value is not valid HTTP, and the derived length/encoding
    /// fields, are skipped. Returns the number of fields skipped.
    pub fn apply_to(&self, headers: &mut HeaderMap) -> usize {
        let mut skipped = 0;
        for field in &self.fields {
            if field.is_derived() {
                skipped += 1;
                continue;
            }
            let name = HeaderName::from_bytes(&field.name);
            let value = HeaderValue::from_maybe_shared(field.value.clone());
            match (name, value) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => {
                    tracing::debug!(
                        name = %String::from_utf8_lossy(&field.name),
                        "Skipping invalid stored header field"
                    );
                    skipped += 1;
                }
            }
        }
        skipped
    }

    /// First value for a header name, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name.as_bytes()))
            .map(|f| f.value.as_ref())
    }

    pub fn fields(&self) -> &[HeaderField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// `content-type` -> `Content-Type`
fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}
