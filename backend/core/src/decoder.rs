//! Incremental UTF-8 decoding for chunked response bodies.
//!
//! A multi-byte character may be split across two network chunks. The
//! decoder holds the incomplete tail of one chunk and completes it with the
//! head of the next, so split characters come out intact instead of as
//! replacement characters.

/// Replacement character emitted for invalid or truncated sequences.
pub const REPLACEMENT: char = '\u{FFFD}';

/// Stateful UTF-8 decoder that carries partial sequences between calls.
#[derive(Debug, Default, Clone)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning all characters it completes.
    ///
    /// Invalid bytes decode to U+FFFD. A trailing incomplete sequence is
    /// held back until the next call or `finish`.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        out.push_str(valid);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at end of stream. A dangling partial sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT.to_string()
        }
    }

    /// Whether bytes of an unfinished character are being held.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"hello "), "hello ");
        assert_eq!(decoder.decode(b"world"), "world");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_split_multibyte_character() {
        // "é" is 0xC3 0xA9, "€" is 0xE2 0x82 0xAC
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(&[b'c', b'a', b'f', 0xC3]), "caf");
        assert!(decoder.has_pending());
        assert_eq!(decoder.decode(&[0xA9, b' ', 0xE2]), "é ");
        assert_eq!(decoder.decode(&[0x82]), "");
        assert_eq!(decoder.decode(&[0xAC]), "€");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_four_byte_character_one_byte_per_chunk() {
        let bytes = "🦀".as_bytes();
        let mut decoder = Utf8StreamDecoder::new();
        let mut out = String::new();
        for b in bytes {
            out.push_str(&decoder.decode(std::slice::from_ref(b)));
        }
        assert_eq!(out, "🦀");
    }

    #[test]
    fn test_invalid_byte_is_replaced() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn test_truncated_tail_flushes_as_replacement() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(&[b'x', 0xE2, 0x82]), "x");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert!(!decoder.has_pending());
    }
}
