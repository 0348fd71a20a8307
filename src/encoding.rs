//! Best-effort character decoding for fetched pages.
//!
//! Nothing in here fails: bytes that cannot be decoded are replaced with
//! U+FFFD so a single bad page never aborts the run. Pages are decoded once,
//! at the byte boundary, so every description that reaches the table is
//! already canonical UTF-8.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

/// How far into a document a `<meta>` charset declaration is looked for.
const META_SNIFF_LEN: usize = 1024;

/// Matches both `<meta charset="...">` and the `http-equiv` form whose
/// `content` attribute carries `charset=...`.
static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_.:\-]+)"#).unwrap()
});

/// Decode an HTTP body to UTF-8.
///
/// Resolution order:
///
/// 1. a byte order mark
/// 2. the `charset` label from the response headers
/// 3. a `<meta>` charset declaration in the first kilobyte
/// 4. UTF-8, when the bytes are valid UTF-8
/// 5. a statistical guess over the whole body
pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    let encoding = charset
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .or_else(|| sniff_meta_charset(bytes))
        .unwrap_or_else(|| guess_encoding(bytes));
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        debug!(encoding = encoding.name(), "Replaced undecodable bytes in body");
    }
    text.into_owned()
}

/// Encoding named by a `<meta>` tag near the top of the document.
///
/// A declared UTF-16 variant means UTF-8: the tag could not have been read
/// as ASCII otherwise.
fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    let label = META_CHARSET.captures(head)?.get(1)?.as_bytes();
    let encoding = Encoding::for_label(label)?.output_encoding();
    debug!(encoding = encoding.name(), "Using charset from meta tag");
    Some(encoding)
}

fn guess_encoding(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    debug!(encoding = encoding.name(), "Guessed charset of undeclared body");
    encoding
}

/// Pull the `charset` parameter out of a `Content-Type` header value.
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_body_plain_utf8() {
        assert_eq!(decode_body("café".as_bytes(), None), "café");
    }

    #[test]
    fn test_decode_body_uses_declared_charset() {
        // "café" in ISO-8859-1
        let bytes = b"caf\xe9";
        assert_eq!(decode_body(bytes, Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_decode_body_bom_wins_over_charset() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("naïve".as_bytes());
        assert_eq!(decode_body(&bytes, Some("iso-8859-1")), "naïve");
    }

    #[test]
    fn test_decode_body_unknown_label_falls_back_to_utf8() {
        assert_eq!(decode_body(b"hello", Some("not-a-charset")), "hello");
    }

    #[test]
    fn test_decode_body_reads_meta_charset() {
        let body = decode_body(
            b"<html><head><meta charset=\"windows-1252\"></head><body>Caf\xe9 hack</body></html>",
            None,
        );
        assert!(body.contains("Café hack"), "{body}");
    }

    #[test]
    fn test_decode_body_reads_http_equiv_charset() {
        let body = decode_body(
            b"<HEAD><META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=ISO-8859-1\"></HEAD>na\xefve",
            None,
        );
        assert!(body.ends_with("naïve"), "{body}");
    }

    #[test]
    fn test_decode_body_header_charset_wins_over_meta() {
        let body = decode_body(
            "<meta charset=\"windows-1252\">café".as_bytes(),
            Some("utf-8"),
        );
        assert!(body.ends_with("café"), "{body}");
    }

    #[test]
    fn test_decode_body_meta_utf16_means_utf8() {
        let body = decode_body("<meta charset=\"utf-16\">café".as_bytes(), None);
        assert!(body.ends_with("café"), "{body}");
    }

    #[test]
    fn test_decode_body_ignores_meta_after_first_kilobyte() {
        let mut bytes = vec![b' '; META_SNIFF_LEN];
        bytes.extend_from_slice("<meta charset=\"windows-1252\">café".as_bytes());
        let body = decode_body(&bytes, None);
        assert!(body.ends_with("café"), "{body}");
    }

    #[test]
    fn test_decode_body_guesses_undeclared_legacy_encoding() {
        let body = decode_body(
            b"<p>Le caf\xe9 de la soci\xe9t\xe9 a \xe9t\xe9 pirat\xe9 apr\xe8s une fuite de donn\xe9es \
              personnelles. Les d\xe9tails de l'attaque restent inconnus.</p>",
            None,
        );
        assert!(!body.contains('\u{FFFD}'), "{body}");
        assert!(body.contains('é'), "{body}");
    }

    #[test]
    fn test_decode_body_replaces_invalid_utf8_when_declared() {
        let body = decode_body(b"bad \xff\xfe bytes", Some("utf-8"));
        assert_eq!(body, "bad \u{FFFD}\u{FFFD} bytes");
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_from_content_type("text/html;Charset=\"utf-8\""),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }
}
