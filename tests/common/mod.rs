//! In-process ZIP archive builder for tests.

#![allow(dead_code)]

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::Crc;
use flate2::write::DeflateEncoder;

struct PendingEntry {
    name: String,
    data: Vec<u8>,
    method: u16,
    crc_override: Option<u32>,
    offset_override: Option<u64>,
}

#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<PendingEntry>,
    comment: Vec<u8>,
    zip64: bool,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(PendingEntry {
            name: name.to_string(),
            data: data.to_vec(),
            method: 0,
            crc_override: None,
            offset_override: None,
        });
        self
    }

    pub fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(PendingEntry {
            name: name.to_string(),
            data: data.to_vec(),
            method: 8,
            crc_override: None,
            offset_override: None,
        });
        self
    }

    pub fn directory(self, name: &str) -> Self {
        assert!(name.ends_with('/'));
        self.stored(name, b"")
    }

    /// A stored entry whose recorded CRC does not match its content.
    pub fn corrupt(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(PendingEntry {
            name: name.to_string(),
            data: data.to_vec(),
            method: 0,
            crc_override: Some(0xDEAD_BEEF),
            offset_override: None,
        });
        self
    }

    /// An entry using a compression method the reader does not support (bzip2).
    pub fn unsupported(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(PendingEntry {
            name: name.to_string(),
            data: data.to_vec(),
            method: 12,
            crc_override: None,
            offset_override: None,
        });
        self
    }

    /// A stored entry whose central directory header points at `lfh_offset`
    /// through a ZIP64 extra field instead of its real local header.
    pub fn misplaced(mut self, name: &str, data: &[u8], lfh_offset: u64) -> Self {
        self.entries.push(PendingEntry {
            name: name.to_string(),
            data: data.to_vec(),
            method: 0,
            crc_override: None,
            offset_override: Some(lfh_offset),
        });
        self
    }

    /// Write ZIP64 records: saturated header fields backed by 0x0001 extras,
    /// a ZIP64 end of central directory record and its locator.
    pub fn zip64(mut self) -> Self {
        self.zip64 = true;
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.as_bytes().to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let mut crc = Crc::new();
            crc.update(&entry.data);
            let crc32 = entry.crc_override.unwrap_or(crc.sum());

            let payload = if entry.method == 8 {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&entry.data).unwrap();
                encoder.finish().unwrap()
            } else {
                entry.data.clone()
            };

            let local_offset = out.len() as u64;
            out.write_all(b"PK\x03\x04").unwrap();
            out.write_u16::<LittleEndian>(20).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(entry.method).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(0x21).unwrap();
            out.write_u32::<LittleEndian>(crc32).unwrap();
            out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(entry.data.len() as u32).unwrap();
            out.write_u16::<LittleEndian>(entry.name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_all(entry.name.as_bytes()).unwrap();
            out.write_all(&payload).unwrap();

            // ZIP64 extra values appear in this order, only for saturated fields.
            let offset = entry.offset_override.unwrap_or(local_offset);
            let offset_in_extra = self.zip64 || entry.offset_override.is_some();
            let mut extra = Vec::new();
            let (cd_compressed, cd_uncompressed) = if self.zip64 {
                extra.write_u64::<LittleEndian>(entry.data.len() as u64).unwrap();
                extra.write_u64::<LittleEndian>(payload.len() as u64).unwrap();
                (u32::MAX, u32::MAX)
            } else {
                (payload.len() as u32, entry.data.len() as u32)
            };
            let cd_offset_field = if offset_in_extra {
                extra.write_u64::<LittleEndian>(offset).unwrap();
                u32::MAX
            } else {
                offset as u32
            };
            let extra_field_len = if extra.is_empty() {
                0
            } else {
                extra.len() as u16 + 4
            };

            central.write_all(b"PK\x01\x02").unwrap();
            central.write_u16::<LittleEndian>(45).unwrap();
            central.write_u16::<LittleEndian>(20).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(entry.method).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0x21).unwrap();
            central.write_u32::<LittleEndian>(crc32).unwrap();
            central.write_u32::<LittleEndian>(cd_compressed).unwrap();
            central.write_u32::<LittleEndian>(cd_uncompressed).unwrap();
            central.write_u16::<LittleEndian>(entry.name.len() as u16).unwrap();
            central.write_u16::<LittleEndian>(extra_field_len).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u32::<LittleEndian>(0).unwrap();
            central.write_u32::<LittleEndian>(cd_offset_field).unwrap();
            central.write_all(entry.name.as_bytes()).unwrap();
            if !extra.is_empty() {
                central.write_u16::<LittleEndian>(0x0001).unwrap();
                central.write_u16::<LittleEndian>(extra.len() as u16).unwrap();
                central.write_all(&extra).unwrap();
            }
        }

        let cd_offset = out.len() as u64;
        out.write_all(&central).unwrap();

        let count = self.entries.len() as u64;
        if self.zip64 {
            let eocd64_offset = out.len() as u64;
            out.write_all(b"PK\x06\x06").unwrap();
            out.write_u64::<LittleEndian>(44).unwrap();
            out.write_u16::<LittleEndian>(45).unwrap();
            out.write_u16::<LittleEndian>(45).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(count).unwrap();
            out.write_u64::<LittleEndian>(count).unwrap();
            out.write_u64::<LittleEndian>(central.len() as u64).unwrap();
            out.write_u64::<LittleEndian>(cd_offset).unwrap();

            out.write_all(b"PK\x06\x07").unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(eocd64_offset).unwrap();
            out.write_u32::<LittleEndian>(1).unwrap();
        }

        let (eocd_count, eocd_size, eocd_offset) = if self.zip64 {
            (u16::MAX, u32::MAX, u32::MAX)
        } else {
            (count as u16, central.len() as u32, cd_offset as u32)
        };
        out.write_all(b"PK\x05\x06").unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(eocd_count).unwrap();
        out.write_u16::<LittleEndian>(eocd_count).unwrap();
        out.write_u32::<LittleEndian>(eocd_size).unwrap();
        out.write_u32::<LittleEndian>(eocd_offset).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16).unwrap();
        out.write_all(&self.comment).unwrap();

        out
    }
}
