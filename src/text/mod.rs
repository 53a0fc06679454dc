//! Per-entry text handling: deciding which entries are text, and decoding them.

mod classifier;
mod decoder;

pub use classifier::{ExtensionClassifier, TextClassifier};
pub use decoder::{ContentDecoder, DecodeResult, FallbackDecoder, TextEncoding};
