use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::github::CanonicalReference;
use crate::logging::Verbosity;
use crate::pipeline::ProcessingSettings;

#[derive(Parser, Debug)]
#[command(name = "ziplinear")]
#[command(version)]
#[command(
    about = "Concatenate the text files of a ZIP archive or GitHub repository",
    long_about = None
)]
#[command(after_help = "Examples:\n  \
  ziplinear archive.zip                              writes archive.linearized.txt\n  \
  ziplinear archive.zip -o out.txt -d '\\n\\n'         custom output and delimiter\n  \
  ziplinear https://github.com/owner/repo            default branch\n  \
  ziplinear https://github.com/owner/repo/tree/dev   specific branch\n  \
  ziplinear https://github.com/owner/repo/pull/123   pull request head branch")]
pub struct Cli {
    /// ZIP file path or GitHub repository / branch / pull request URL
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Output file (default: <archive>.linearized.txt)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Delimiter written after each file; \n and \t escapes are expanded
    #[arg(short = 'd', long, default_value = "\\n---\\n")]
    pub delimiter: String,

    /// Additional text file extensions (repeatable)
    #[arg(short = 'e', long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Encoding tried first, strictly
    #[arg(long, default_value = "utf-8", value_name = "LABEL")]
    pub encoding: String,

    /// Encoding used when the first one rejects a file
    #[arg(long, default_value = "latin-1", value_name = "LABEL")]
    pub fallback_encoding: String,

    /// Debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Warnings and errors only
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Keep the downloaded archive instead of deleting it
    #[arg(long)]
    pub keep_temp: bool,

    /// GitHub token used for API requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    pub fn settings(&self) -> ProcessingSettings {
        ProcessingSettings {
            primary_encoding: self.encoding.clone(),
            fallback_encoding: self.fallback_encoding.clone(),
            extra_extensions: self.extensions.iter().cloned().collect::<BTreeSet<_>>(),
            ..ProcessingSettings::default()
        }
        .with_delimiter(unescape(&self.delimiter))
    }

    /// Output path for a local archive: `x.zip` -> `x.linearized.txt`.
    pub fn local_output(&self, archive: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| archive.with_extension("linearized.txt"))
    }

    /// Output path for a repository: `{repo}-{ref}.linearized.txt`.
    pub fn remote_output(&self, reference: &CanonicalReference) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.linearized.txt", reference.slug())))
    }
}

/// Expand `\n`, `\t`, `\r` and `\\` so delimiters can be typed in a shell.
fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
