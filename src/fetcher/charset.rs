//! Notice boards are a mix of UTF-8 and legacy encodings, often declared
//! wrongly. Decoding is lossy rather than rejecting the page.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Leading body bytes searched for a `<meta>` declaration.
const SNIFF_WINDOW: usize = 4096;

static HEADER_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).expect("valid charset regex")
});

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#)
        .expect("valid meta charset regex")
});

static META_HTTP_EQUIV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#)
        .expect("valid http-equiv regex")
});

/// Content-Type header, then `<meta charset>`, then `<meta http-equiv>`,
/// then a chardetng guess over the leading bytes.
pub fn detect_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = declared(&HEADER_CHARSET, content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_WINDOW)];
    let head_text = String::from_utf8_lossy(head);
    for pattern in [&*META_CHARSET, &*META_HTTP_EQUIV] {
        if let Some(encoding) = declared(pattern, &head_text) {
            return encoding;
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, false);
    detector.guess(None, true)
}

fn declared(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?;
    Encoding::for_label(label.as_str().as_bytes())
}

/// Decode a fetched body. A byte-order mark wins over the detected encoding;
/// the encoding actually used is returned alongside the text.
pub fn decode_body(content_type: &str, body: &[u8]) -> (String, &'static Encoding) {
    let detected = detect_encoding(content_type, body);
    let (decoded, used, had_errors) = detected.decode(body);

    if had_errors {
        warn!(
            encoding = used.name(),
            "page contained bytes invalid for its charset; replaced"
        );
    }

    (decoded.into_owned(), used)
}
