//! Central directory parsing.
//!
//! ZIP archives are read from the end:
//! 1. Locate the End of Central Directory (EOCD), scanning back over a
//!    trailing comment if there is one
//! 2. Follow the ZIP64 locator when the EOCD fields are saturated
//! 3. Read the whole central directory in one call and decode its headers
//! 4. On demand, read a Local File Header to find where entry data starts

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::structures::*;

/// Largest comment the EOCD length field can describe.
const MAX_COMMENT_SIZE: u64 = u16::MAX as u64;

/// Reads archive structure from a [`ReadAt`] source.
///
/// Used through [`ZipExtractor`](super::ZipExtractor) rather than directly.
pub struct ZipParser<R: ReadAt> {
    reader: Arc<R>,
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find the EOCD record and its offset in the archive.
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        if self.size == 0 {
            bail!("archive is empty");
        }
        if self.size < EndOfCentralDirectory::SIZE as u64 {
            bail!("archive is too small to be a ZIP file ({} bytes)", self.size);
        }

        // Common case: no comment, EOCD is the last 22 bytes.
        let offset = self.size - EndOfCentralDirectory::SIZE as u64;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader.read_at(offset, &mut buf).await?;
        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && buf[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::from_bytes(&buf)?, offset));
        }

        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(self.size);
        let search_start = self.size - search_size;
        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_at(search_start, &mut buf).await?;

        let last_candidate = buf.len() - EndOfCentralDirectory::SIZE;
        for i in (0..=last_candidate).rev() {
            if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            // The comment must run exactly to the end of the archive.
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, search_start + i as u64));
            }
        }

        bail!("no end of central directory record found; not a ZIP file")
    }

    async fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EndOfCentralDirectory> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64Locator::SIZE as u64)
            .context("ZIP64 locator would start before the archive")?;
        let mut locator_buf = vec![0u8; Zip64Locator::SIZE];
        self.reader.read_at(locator_offset, &mut locator_buf).await?;
        let locator = Zip64Locator::from_bytes(&locator_buf)?;

        let record_end = locator
            .eocd64_offset
            .checked_add(Zip64EndOfCentralDirectory::MIN_SIZE as u64);
        if record_end.is_none_or(|end| end > locator_offset) {
            bail!(
                "ZIP64 end of central directory offset {} is out of range",
                locator.eocd64_offset
            );
        }
        let mut record = vec![0u8; Zip64EndOfCentralDirectory::MIN_SIZE];
        self.reader.read_at(locator.eocd64_offset, &mut record).await?;
        Zip64EndOfCentralDirectory::from_bytes(&record)
    }

    /// List every entry in central directory order.
    pub async fn list_entries(&self) -> Result<Vec<ArchiveEntry>> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        let (cd_offset, cd_size, total_entries) = if eocd.needs_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset).await?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        match cd_offset.checked_add(cd_size) {
            Some(end) if end <= eocd_offset => {}
            _ => bail!(
                "central directory ({} bytes at offset {}) lies outside the archive",
                cd_size,
                cd_offset
            ),
        }
        if total_entries > cd_size / CDFH_MIN_SIZE as u64 {
            bail!(
                "central directory of {} bytes cannot hold {} entries",
                cd_size,
                total_entries
            );
        }

        let mut cd_data = vec![0u8; cd_size as usize];
        self.reader.read_at(cd_offset, &mut cd_data).await?;

        let mut cursor = Cursor::new(cd_data.as_slice());
        let mut entries = Vec::with_capacity(total_entries as usize);
        for index in 0..total_entries {
            let entry = parse_central_header(&mut cursor)
                .with_context(|| format!("central directory entry {} is corrupt", index))?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Offset of the first content byte of `entry`.
    ///
    /// The local header's name and extra lengths may differ from the central
    /// directory copy, so they are read from the local header itself.
    pub async fn data_offset(&self, entry: &ArchiveEntry) -> Result<u64> {
        let header_end = entry.lfh_offset.checked_add(LFH_SIZE as u64);
        if header_end.is_none_or(|end| end > self.size) {
            bail!(
                "local file header of {} at offset {} lies outside the archive",
                entry.name,
                entry.lfh_offset
            );
        }

        let mut lfh = vec![0u8; LFH_SIZE];
        self.reader.read_at(entry.lfh_offset, &mut lfh).await?;
        if &lfh[0..4] != LFH_SIGNATURE {
            bail!("local file header signature mismatch at offset {}", entry.lfh_offset);
        }

        let mut cursor = Cursor::new(&lfh[26..]);
        let name_len = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_len = cursor.read_u16::<LittleEndian>()? as u64;

        entry
            .lfh_offset
            .checked_add(LFH_SIZE as u64 + name_len + extra_len)
            .context("entry data offset overflows")
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}

fn parse_central_header(cursor: &mut Cursor<&[u8]>) -> Result<ArchiveEntry> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        bail!("central directory header signature mismatch");
    }

    // version made by, version needed, flags
    cursor.set_position(cursor.position() + 6);
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    // modification time and date
    cursor.set_position(cursor.position() + 4);
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let name_len = cursor.read_u16::<LittleEndian>()? as usize;
    let extra_len = cursor.read_u16::<LittleEndian>()? as u64;
    let comment_len = cursor.read_u16::<LittleEndian>()? as u64;
    // disk start, internal attributes, external attributes
    cursor.set_position(cursor.position() + 8);
    let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name_bytes = vec![0u8; name_len];
    cursor.read_exact(&mut name_bytes)?;
    let name = String::from_utf8_lossy(&name_bytes).into_owned();

    let extra_end = cursor.position() + extra_len;
    if extra_end > cursor.get_ref().len() as u64 {
        bail!("extra field of {} runs past the central directory", name);
    }
    while cursor.position() + 4 <= extra_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()? as u64;
        let field_end = (cursor.position() + field_size).min(extra_end);

        if header_id == ZIP64_EXTRA_ID {
            // Present only for header fields saturated at 0xFFFFFFFF, in this order.
            if uncompressed_size == u32::MAX as u64 && cursor.position() + 8 <= field_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == u32::MAX as u64 && cursor.position() + 8 <= field_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if lfh_offset == u32::MAX as u64 && cursor.position() + 8 <= field_end {
                lfh_offset = cursor.read_u64::<LittleEndian>()?;
            }
        }
        cursor.set_position(field_end);
    }
    cursor.set_position(extra_end + comment_len);

    Ok(ArchiveEntry {
        is_directory: ArchiveEntry::is_directory_name(&name),
        name,
        compression_method: CompressionMethod::from(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
    })
}
