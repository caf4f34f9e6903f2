//! Response body normalization: gzip sniffing and head/tail truncation

use flate2::read::MultiGzDecoder;
use std::borrow::Cow;
use std::io::Read;

/// Bodies up to this many bytes are returned verbatim.
pub const MAX_INLINE_BODY: usize = 16 * 1024;
/// Bytes kept from each end of a larger body.
pub const TRUNCATED_EDGE: usize = 8 * 1024;
pub const TRUNCATION_MARKER: &str = "\n... [truncated] ...\n";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decompress gzip payloads detected by magic bytes. Corrupt gzip data is
/// returned unchanged.
pub fn decode_body(raw: &[u8]) -> Cow<'_, [u8]> {
    if !raw.starts_with(&GZIP_MAGIC) {
        return Cow::Borrowed(raw);
    }

    let mut decoded = Vec::with_capacity(raw.len() * 4);
    match MultiGzDecoder::new(raw).read_to_end(&mut decoded) {
        Ok(_) => Cow::Owned(decoded),
        Err(_) => Cow::Borrowed(raw),
    }
}

/// Keep the first and last [`TRUNCATED_EDGE`] bytes of bodies larger than
/// [`MAX_INLINE_BODY`].
pub fn truncate_body(bytes: &[u8]) -> Cow<'_, [u8]> {
    if bytes.len() <= MAX_INLINE_BODY {
        return Cow::Borrowed(bytes);
    }

    let mut out = Vec::with_capacity(2 * TRUNCATED_EDGE + TRUNCATION_MARKER.len());
    out.extend_from_slice(&bytes[..TRUNCATED_EDGE]);
    out.extend_from_slice(TRUNCATION_MARKER.as_bytes());
    out.extend_from_slice(&bytes[bytes.len() - TRUNCATED_EDGE..]);
    Cow::Owned(out)
}

/// Decode then truncate, as text. Invalid UTF-8 becomes U+FFFD.
pub fn shape_body(raw: &[u8]) -> String {
    let decoded = decode_body(raw);
    let truncated = truncate_body(&decoded);
    String::from_utf8_lossy(&truncated).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn small_body_is_untouched() {
        let body = vec![b'x'; MAX_INLINE_BODY];
        assert_eq!(truncate_body(&body).as_ref(), body.as_slice());
        assert_eq!(shape_body(b"hello"), "hello");
    }

    #[test]
    fn large_body_keeps_head_and_tail() {
        let mut body = vec![b'a'; TRUNCATED_EDGE];
        body.extend(vec![b'm'; 5000]);
        body.extend(vec![b'z'; TRUNCATED_EDGE]);
        let len = body.len();

        let out = truncate_body(&body);
        let mut expected = body[..TRUNCATED_EDGE].to_vec();
        expected.extend_from_slice(TRUNCATION_MARKER.as_bytes());
        expected.extend_from_slice(&body[len - TRUNCATED_EDGE..]);
        assert_eq!(out.as_ref(), expected.as_slice());
        assert!(!out.contains(&b'm'));
    }

    #[test]
    fn truncated_length_is_fixed() {
        let expected = 2 * TRUNCATED_EDGE + TRUNCATION_MARKER.len();
        for len in [MAX_INLINE_BODY + 1, 50_000, 1_000_000] {
            assert_eq!(truncate_body(&vec![b'q'; len]).len(), expected);
        }
    }

    #[test]
    fn gzip_body_is_decompressed() {
        let packed = gzip(b"There isn't a GitHub Pages site here.");
        assert_eq!(shape_body(&packed), "There isn't a GitHub Pages site here.");
    }

    #[test]
    fn gzip_then_truncate() {
        let plain = vec![b'k'; 40_000];
        let out = shape_body(&gzip(&plain));
        assert_eq!(out.len(), 2 * TRUNCATED_EDGE + TRUNCATION_MARKER.len());
        assert!(out.contains("[truncated]"));
    }

    #[test]
    fn corrupt_gzip_falls_back_to_raw() {
        let raw = [0x1f, 0x8b, 0x00, 0x01, 0x02, b'h', b'i'];
        assert_eq!(decode_body(&raw).as_ref(), &raw[..]);
    }
}
