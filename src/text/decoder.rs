use encoding_rs::Encoding;

use crate::error::{LinearizeError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    pub text: String,
    pub encoding_used: String,
}

/// Turns raw entry bytes into text.
pub trait ContentDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodeResult>;
}

/// A named text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    /// Any other WHATWG encoding known to `encoding_rs`.
    Other(&'static Encoding),
}

impl TextEncoding {
    pub fn for_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(TextEncoding::Latin1),
            _ => match Encoding::for_label(normalized.as_bytes()) {
                Some(enc) if enc == encoding_rs::UTF_8 => Ok(TextEncoding::Utf8),
                Some(enc) => Ok(TextEncoding::Other(enc)),
                None => Err(LinearizeError::Config(format!(
                    "unknown encoding label '{}'",
                    label
                ))),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Other(enc) => enc.name(),
        }
    }

    /// Decode without substituting anything; `None` if the bytes are invalid.
    fn decode_strict(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            TextEncoding::Latin1 => Some(decode_latin1(bytes)),
            TextEncoding::Other(enc) => enc
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }

    /// Decode, replacing invalid sequences with U+FFFD. Never fails.
    fn decode_lossy(&self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => decode_latin1(bytes),
            TextEncoding::Other(enc) => enc.decode_without_bom_handling(bytes).0.into_owned(),
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Strict primary encoding, total fallback encoding.
#[derive(Debug, Clone)]
pub struct FallbackDecoder {
    primary: TextEncoding,
    fallback: TextEncoding,
}

impl FallbackDecoder {
    pub fn new(primary: TextEncoding, fallback: TextEncoding) -> Self {
        Self { primary, fallback }
    }

    pub fn from_labels(primary: &str, fallback: &str) -> Result<Self> {
        Ok(Self::new(
            TextEncoding::for_label(primary)?,
            TextEncoding::for_label(fallback)?,
        ))
    }
}

impl Default for FallbackDecoder {
    fn default() -> Self {
        Self::new(TextEncoding::Utf8, TextEncoding::Latin1)
    }
}

impl ContentDecoder for FallbackDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodeResult> {
        if let Some(text) = self.primary.decode_strict(bytes) {
            return Ok(DecodeResult {
                text,
                encoding_used: self.primary.name().to_string(),
            });
        }

        log::debug!(
            "{} decoding rejected {} bytes, falling back to {}",
            self.primary.name(),
            bytes.len(),
            self.fallback.name()
        );
        Ok(DecodeResult {
            text: self.fallback.decode_lossy(bytes),
            encoding_used: self.fallback.name().to_string(),
        })
    }
}
