use std::fmt;

/// An entry that could not be read or decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryError {
    pub name: String,
    pub reason: String,
}

/// Counters for one run.
///
/// Every entry lands in exactly one of processed, skipped or failed, so
/// `total_files == processed_files + skipped_files + failed_files`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStatistics {
    pub total_files: usize,
    pub processed_files: usize,
    pub skipped_files: usize,
    pub failed_files: usize,
    /// UTF-8 bytes of decoded text written (headers and delimiters excluded).
    pub total_bytes_written: u64,
    pub archive_size: u64,
    pub errors: Vec<EntryError>,
}

impl ProcessingStatistics {
    pub(crate) fn record_failure(&mut self, name: &str, reason: String) {
        self.failed_files += 1;
        self.errors.push(EntryError {
            name: name.to_string(),
            reason,
        });
    }

    pub fn has_failures(&self) -> bool {
        self.failed_files > 0
    }
}

impl fmt::Display for ProcessingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total files: {}", self.total_files)?;
        writeln!(f, "Processed: {}", self.processed_files)?;
        writeln!(f, "Skipped: {}", self.skipped_files)?;
        writeln!(f, "Errors: {}", self.failed_files)?;
        writeln!(f, "Archive size: {}", format_size(self.archive_size))?;
        write!(f, "Text written: {}", format_size(self.total_bytes_written))?;
        for error in &self.errors {
            write!(f, "\n  {}: {}", error.name, error.reason)?;
        }
        Ok(())
    }
}

/// Format a byte size into a human-readable string.
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
