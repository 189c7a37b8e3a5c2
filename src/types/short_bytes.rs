//! Byte payload with a one-byte length prefix.

use crate::types::encoding::{Decode, DecodeError, Encode, EncodeSink, read_bytes};
use std::ops::Deref;

/// Longest payload a one-byte length prefix can describe.
pub const SHORT_BYTES_MAX: usize = u8::MAX as usize;

/// Bytes encoded as `len: u8` followed by `len` raw bytes.
///
/// [`ShortBytes::from_text`] truncates anything past [`SHORT_BYTES_MAX`], so
/// encoding never emits a length byte that disagrees with the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortBytes(Vec<u8>);

impl ShortBytes {
    /// Wraps the UTF-8 bytes of `text`, truncated on a character boundary so
    /// the payload always decodes back to valid UTF-8.
    pub fn from_text(text: &str) -> Self {
        let mut end = text.len().min(SHORT_BYTES_MAX);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self(text.as_bytes()[..end].to_vec())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for ShortBytes {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Encode for ShortBytes {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        (self.0.len() as u8).encode(out);
        out.write(&self.0);
    }
}

impl Decode for ShortBytes {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let len = u8::decode(input)? as usize;
        Ok(Self(read_bytes(input, len)?.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_length_then_payload() {
        assert_eq!(ShortBytes::from_text("hi").to_bytes(), vec![2, b'h', b'i']);
        assert_eq!(ShortBytes::default().to_bytes(), vec![0]);
    }

    #[test]
    fn truncates_long_payloads() {
        let long = ShortBytes::from_text(&"x".repeat(300));
        assert_eq!(long.len(), SHORT_BYTES_MAX);
        let bytes = long.to_bytes();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 256);
    }

    #[test]
    fn text_truncation_respects_char_boundaries() {
        // 127 two-byte characters = 254 bytes, the next one would straddle 255.
        let text = "é".repeat(128);
        let short = ShortBytes::from_text(&text);
        assert_eq!(short.len(), 254);
        assert!(std::str::from_utf8(&short).is_ok());
    }

    #[test]
    fn decode_rejects_short_payload() {
        let mut input: &[u8] = &[3, b'a', b'b'];
        assert_eq!(ShortBytes::decode(&mut input), Err(DecodeError::UnexpectedEof));
    }
}
