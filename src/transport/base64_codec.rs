//! Base64 transport codec
//!
//! Standard alphabet with padding. The encoded form never contains NUL
//! bytes, so stripping block padding after reassembly is lossless.

use super::{TextEncoding, TransportCodec};
use crate::error::CodecError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec {
    text_encoding: TextEncoding,
}

impl Base64Codec {
    pub fn new(text_encoding: TextEncoding) -> Self {
        Base64Codec { text_encoding }
    }
}

impl TransportCodec for Base64Codec {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn encode(&self, data: &[u8]) -> Vec<u8> {
        STANDARD.encode(data).into_bytes()
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(STANDARD.decode(data)?)
    }

    fn text_encoding(&self) -> TextEncoding {
        self.text_encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_binary() {
        let codec = Base64Codec::default();
        let data: Vec<u8> = (0..=255u8).chain([0, 0, 0]).collect();

        let encoded = codec.encode(&data);
        assert!(!encoded.contains(&0));
        assert_eq!(codec.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_known_vector() {
        let codec = Base64Codec::default();
        assert_eq!(codec.encode(b"hello"), b"aGVsbG8=".to_vec());
        assert_eq!(codec.decode_text(b"aGVsbG8=").unwrap(), "hello");
    }

    #[test]
    fn test_malformed_input() {
        let codec = Base64Codec::default();
        assert!(matches!(codec.decode(b"a!b@"), Err(CodecError::Base64(_))));
    }

    #[test]
    fn test_declared_text_encoding() {
        let codec = Base64Codec::new(TextEncoding::Latin1);
        let encoded = codec.encode(&[0x63, 0x61, 0x66, 0xe9]);
        assert_eq!(codec.decode_text(&encoded).unwrap(), "café");

        let strict = Base64Codec::new(TextEncoding::Utf8);
        assert!(matches!(
            strict.decode_text(&encoded),
            Err(CodecError::Text {
                encoding: TextEncoding::Utf8
            })
        ));
    }
}
