use super::ReadAt;
use anyhow::{Result, bail};
use async_trait::async_trait;

/// Random access over an owned byte buffer, e.g. a freshly downloaded archive.
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for MemoryReader {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = usize::try_from(offset)?;
        let end = start.checked_add(buf.len());
        match end {
            Some(end) if end <= self.data.len() => {
                buf.copy_from_slice(&self.data[start..end]);
                Ok(buf.len())
            }
            _ => bail!(
                "read of {} bytes at offset {} exceeds buffer size {}",
                buf.len(),
                offset,
                self.data.len()
            ),
        }
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
