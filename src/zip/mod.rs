//! ZIP archive reading.
//!
//! - [`structures`]: fixed-layout records (EOCD, ZIP64 records, entry metadata)
//! - [`parser`]: locating and decoding the central directory
//! - [`extractor`]: reading entry content with integrity checks
//!
//! Only what the linearizer needs is supported: single-disk archives, ZIP64
//! sizes and offsets, STORED and DEFLATE entries. Encrypted entries and other
//! compression methods fail individually when read.

mod extractor;
mod parser;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;
