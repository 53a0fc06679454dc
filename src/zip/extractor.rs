use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Result, bail};

use super::parser::ZipParser;
use super::structures::{ArchiveEntry, CompressionMethod};

/// Lists archive entries and reads their content on demand.
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// Entries in the order the central directory stores them.
    pub async fn list_entries(&self) -> Result<Vec<ArchiveEntry>> {
        self.parser.list_entries().await
    }

    /// Size of the underlying archive in bytes.
    pub fn archive_size(&self) -> u64 {
        self.parser.reader().size()
    }

    /// Read and decompress one entry, verifying its size and CRC-32.
    pub async fn read_entry(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        if entry.is_directory {
            bail!("{} is a directory", entry.name);
        }

        let data_offset = self.parser.data_offset(entry).await?;
        let end = data_offset.checked_add(entry.compressed_size);
        if end.is_none_or(|end| end > self.archive_size()) {
            bail!(
                "entry data ({} bytes at offset {}) runs past the end of the archive",
                entry.compressed_size,
                data_offset
            );
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser.reader().read_at(data_offset, &mut raw).await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => inflate(&raw, entry.uncompressed_size)?,
            CompressionMethod::Unsupported(method) => {
                bail!("unsupported compression method {}", method)
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            bail!(
                "size mismatch: expected {} bytes, got {}",
                entry.uncompressed_size,
                data.len()
            );
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            bail!(
                "CRC-32 mismatch: expected {:08x}, got {:08x}",
                entry.crc32,
                crc.sum()
            );
        }

        Ok(data)
    }
}

fn inflate(raw: &[u8], expected_size: u64) -> Result<Vec<u8>> {
    // One extra byte lets an oversized stream show up as a size mismatch
    // without inflating all of it.
    let limit = expected_size.saturating_add(1);
    let mut out = Vec::with_capacity(expected_size.min(64 * 1024 * 1024) as usize);
    DeflateDecoder::new(raw).take(limit).read_to_end(&mut out)?;
    Ok(out)
}
