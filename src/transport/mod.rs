//! Transport codecs
//!
//! A transport codec is a reversible byte transform applied to the logical
//! payload before it is fragmented, and undone after reassembly. Sessions
//! without one use [`Identity`].

pub mod base64_codec;

pub use base64_codec::Base64Codec;

use crate::error::CodecError;
use std::fmt;
use std::str::FromStr;

/// Reversible payload pre/post-processing
pub trait TransportCodec {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn encode(&self, data: &[u8]) -> Vec<u8>;

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Text encoding the decoded bytes are declared to be in
    fn text_encoding(&self) -> TextEncoding {
        TextEncoding::Utf8
    }

    /// Decode and interpret the result as text in [`Self::text_encoding`]
    fn decode_text(&self, data: &[u8]) -> Result<String, CodecError> {
        let bytes = self.decode(data)?;
        self.text_encoding().decode(bytes)
    }
}

/// Pass-through codec
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl TransportCodec for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn encode(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }
}

/// Text encodings a decoded payload can be declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Ascii,
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
}

impl TextEncoding {
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, CodecError> {
        match self {
            TextEncoding::Utf8 => {
                String::from_utf8(bytes).map_err(|_| CodecError::Text { encoding: self })
            }
            TextEncoding::Ascii if bytes.is_ascii() => {
                String::from_utf8(bytes).map_err(|_| CodecError::Text { encoding: self })
            }
            TextEncoding::Ascii => Err(CodecError::Text { encoding: self }),
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin-1",
        };
        f.write_str(name)
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "ascii" | "us-ascii" => Ok(TextEncoding::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            other => Err(format!("unknown text encoding '{}'", other)),
        }
    }
}

/// Which codec a session is configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecSelection {
    #[default]
    None,
    Base64 { text_encoding: TextEncoding },
}

impl CodecSelection {
    pub fn build(self) -> Box<dyn TransportCodec> {
        match self {
            CodecSelection::None => Box::new(Identity),
            CodecSelection::Base64 { text_encoding } => Box::new(Base64Codec::new(text_encoding)),
        }
    }
}

impl FromStr for CodecSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "identity" => Ok(CodecSelection::None),
            "base64" => Ok(CodecSelection::Base64 {
                text_encoding: TextEncoding::Utf8,
            }),
            other => Err(format!("unknown transport codec '{}'", other)),
        }
    }
}
