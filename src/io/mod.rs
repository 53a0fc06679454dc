//! Byte sources and the HTTP transport.
//!
//! Archives are read through [`ReadAt`], which gives the ZIP parser random
//! access to either a local file or an in-memory buffer. Network access goes
//! through [`HttpTransport`] so the GitHub layer never talks to `reqwest`
//! directly.

mod http;
mod local;
mod memory;

pub use http::{HttpResponse, HttpTransport, ReqwestTransport, TransportSettings};
pub use local::LocalFileReader;
pub use memory::MemoryReader;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset, filling the whole buffer.
    ///
    /// Reading past the end of the source is an error.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}
