//! # ziplinear
//!
//! Flattens the text files of a ZIP archive into one document.
//!
//! The archive can be a local file or a GitHub repository, branch or pull
//! request, which is resolved to a concrete ref and downloaded from
//! codeload. Every text entry is decoded (UTF-8 first, Latin-1 as the last
//! resort) and appended as
//!
//! ```text
//! File: <entry name>
//! ================...
//!
//! <decoded text><delimiter>
//! ```
//!
//! in archive order. Unreadable entries are counted and reported without
//! stopping the run.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use ziplinear::{LinearizationPipeline, LocalFileReader, ProcessingSettings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::new(Path::new("project.zip"))?);
//!     let pipeline = LinearizationPipeline::new(ProcessingSettings::default())?;
//!
//!     let stats = pipeline.process(reader, Path::new("project.linearized.txt")).await?;
//!     println!("{}", stats);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod github;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod text;
pub mod zip;

pub use cli::Cli;
pub use error::{LinearizeError, Result};
pub use github::{
    ArchiveFetcher, CanonicalReference, GitHubClient, GitHubConfig, ResolvedSource, Source,
    SourceResolver,
};
pub use io::{
    HttpResponse, HttpTransport, LocalFileReader, MemoryReader, ReadAt, ReqwestTransport,
    TransportSettings,
};
pub use pipeline::{
    EntryError, LinearizationPipeline, LogProgress, ProcessingSettings, ProcessingStatistics,
    ProgressReporter,
};
pub use text::{
    ContentDecoder, DecodeResult, ExtensionClassifier, FallbackDecoder, TextClassifier,
    TextEncoding,
};
pub use zip::{ArchiveEntry, ZipExtractor};
