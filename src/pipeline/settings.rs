use std::collections::BTreeSet;

/// Configuration for one linearization run. Not changed once a run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingSettings {
    /// Written after every processed entry.
    pub delimiter: String,
    pub primary_encoding: String,
    pub fallback_encoding: String,
    /// Extensions accepted in addition to the built-in set.
    pub extra_extensions: BTreeSet<String>,
    /// Line printed under each `File:` header; empty to omit it.
    pub header_separator: String,
    /// Report progress after this many processed entries; 0 disables it.
    pub progress_interval: usize,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            delimiter: "\n---\n".to_string(),
            primary_encoding: "utf-8".to_string(),
            fallback_encoding: "latin-1".to_string(),
            extra_extensions: BTreeSet::new(),
            header_separator: "=".repeat(80),
            progress_interval: 10,
        }
    }
}

impl ProcessingSettings {
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Header block written before an entry's text.
    pub fn header_for(&self, name: &str) -> String {
        if self.header_separator.is_empty() {
            format!("File: {}\n\n", name)
        } else {
            format!("File: {}\n{}\n\n", name, self.header_separator)
        }
    }
}
