//! Archive-to-text linearization.
//!
//! Entries are visited one at a time in central directory order. Each one is
//! skipped (directory or not text), failed (unreadable), or written as
//! `header + text + delimiter`. A bad entry never aborts the run; only an
//! unreadable archive or an unwritable destination does.

mod progress;
mod settings;
mod stats;

pub use progress::{LogProgress, ProgressReporter};
pub use settings::ProcessingSettings;
pub use stats::{EntryError, ProcessingStatistics, format_size};

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::{LinearizeError, Result};
use crate::io::ReadAt;
use crate::text::{ContentDecoder, ExtensionClassifier, FallbackDecoder, TextClassifier};
use crate::zip::{ArchiveEntry, ZipExtractor};

/// What happened to a single entry.
enum EntryOutcome {
    Written,
    Skipped,
    Failed(String),
}

pub struct LinearizationPipeline {
    settings: ProcessingSettings,
    classifier: Box<dyn TextClassifier>,
    decoder: Box<dyn ContentDecoder>,
    progress: Option<Box<dyn ProgressReporter>>,
}

impl LinearizationPipeline {
    /// Pipeline with the extension classifier and fallback decoder that
    /// `settings` describes.
    pub fn new(settings: ProcessingSettings) -> Result<Self> {
        let classifier = ExtensionClassifier::new(&settings.extra_extensions);
        let decoder =
            FallbackDecoder::from_labels(&settings.primary_encoding, &settings.fallback_encoding)?;
        Ok(Self {
            settings,
            classifier: Box::new(classifier),
            decoder: Box::new(decoder),
            progress: None,
        })
    }

    pub fn with_classifier(mut self, classifier: impl TextClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn with_decoder(mut self, decoder: impl ContentDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Linearize the archive behind `reader` into a file at `output`.
    ///
    /// The archive is opened before the output file is created, so an
    /// unreadable archive leaves nothing behind.
    pub async fn process<R: ReadAt + 'static>(
        &self,
        reader: Arc<R>,
        output: &Path,
    ) -> Result<ProcessingStatistics> {
        let extractor = ZipExtractor::new(reader);
        let entries = open_archive(&extractor).await?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| output_error(parent, err))?;
            }
        }
        let file = fs::File::create(output)
            .await
            .map_err(|err| output_error(output, err))?;

        let mut writer = BufWriter::new(file);
        let stats = self.write_entries(&extractor, &entries, &mut writer).await?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|err| output_error(output, err))?;

        log::info!("Result written to {}", output.display());
        Ok(stats)
    }

    /// Linearize the archive behind `reader` into any async writer.
    pub async fn linearize<R, W>(
        &self,
        reader: Arc<R>,
        writer: &mut W,
    ) -> Result<ProcessingStatistics>
    where
        R: ReadAt + 'static,
        W: AsyncWrite + Unpin,
    {
        let extractor = ZipExtractor::new(reader);
        let entries = open_archive(&extractor).await?;
        self.write_entries(&extractor, &entries, writer).await
    }

    async fn write_entries<R, W>(
        &self,
        extractor: &ZipExtractor<R>,
        entries: &[ArchiveEntry],
        writer: &mut W,
    ) -> Result<ProcessingStatistics>
    where
        R: ReadAt + 'static,
        W: AsyncWrite + Unpin,
    {
        let mut stats = ProcessingStatistics {
            archive_size: extractor.archive_size(),
            ..Default::default()
        };
        log::info!(
            "Archive has {} entries ({})",
            entries.len(),
            format_size(stats.archive_size)
        );

        for entry in entries {
            stats.total_files += 1;
            match self.process_entry(extractor, entry, writer, &mut stats).await? {
                EntryOutcome::Written => {
                    stats.processed_files += 1;
                    let interval = self.settings.progress_interval;
                    if interval > 0 && stats.processed_files % interval == 0 {
                        self.report_progress(&stats);
                    }
                }
                EntryOutcome::Skipped => {
                    stats.skipped_files += 1;
                }
                EntryOutcome::Failed(reason) => {
                    log::warn!("Failed to read {}: {}", entry.name, reason);
                    if let Some(progress) = &self.progress {
                        progress.report_error(&entry.name, &reason);
                    }
                    stats.record_failure(&entry.name, reason);
                }
            }
        }

        writer
            .flush()
            .await
            .map_err(|err| LinearizeError::OutputWrite(err.to_string()))?;
        self.report_progress(&stats);

        log::info!(
            "Done: {} processed, {} skipped, {} failed",
            stats.processed_files,
            stats.skipped_files,
            stats.failed_files
        );
        Ok(stats)
    }

    /// Entry-scoped failures come back as [`EntryOutcome::Failed`]; only
    /// output failures are errors.
    async fn process_entry<R, W>(
        &self,
        extractor: &ZipExtractor<R>,
        entry: &ArchiveEntry,
        writer: &mut W,
        stats: &mut ProcessingStatistics,
    ) -> Result<EntryOutcome>
    where
        R: ReadAt + 'static,
        W: AsyncWrite + Unpin,
    {
        if entry.is_directory || !self.classifier.is_text_file(&entry.name) {
            log::debug!("Skipping {}", entry.name);
            return Ok(EntryOutcome::Skipped);
        }

        let bytes = match extractor.read_entry(entry).await {
            Ok(bytes) => bytes,
            Err(err) => return Ok(EntryOutcome::Failed(format!("{:#}", err))),
        };
        let decoded = match self.decoder.decode(&bytes) {
            Ok(decoded) => decoded,
            Err(err) => return Ok(EntryOutcome::Failed(err.to_string())),
        };

        let header = self.settings.header_for(&entry.name);
        for chunk in [
            header.as_bytes(),
            decoded.text.as_bytes(),
            self.settings.delimiter.as_bytes(),
        ] {
            writer
                .write_all(chunk)
                .await
                .map_err(|err| LinearizeError::OutputWrite(err.to_string()))?;
        }

        stats.total_bytes_written += decoded.text.len() as u64;
        log::debug!(
            "Processed {} ({} bytes, {})",
            entry.name,
            decoded.text.len(),
            decoded.encoding_used
        );
        Ok(EntryOutcome::Written)
    }

    fn report_progress(&self, stats: &ProcessingStatistics) {
        if let Some(progress) = &self.progress {
            progress.report(stats.processed_files, stats.skipped_files);
        }
    }
}

async fn open_archive<R: ReadAt + 'static>(
    extractor: &ZipExtractor<R>,
) -> Result<Vec<ArchiveEntry>> {
    extractor
        .list_entries()
        .await
        .map_err(|err| LinearizeError::ArchiveOpen(format!("{:#}", err)))
}

fn output_error(path: &Path, err: std::io::Error) -> LinearizeError {
    LinearizeError::OutputWrite(format!("{}: {}", path.display(), err))
}
