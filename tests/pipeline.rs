mod common;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use common::ZipBuilder;
use pretty_assertions::assert_eq;
use ziplinear::{
    ContentDecoder, DecodeResult, LinearizationPipeline, LinearizeError, LocalFileReader,
    MemoryReader, ProcessingSettings, ProcessingStatistics, ProgressReporter, TextClassifier,
};

fn settings(delimiter: &str) -> ProcessingSettings {
    ProcessingSettings::default().with_delimiter(delimiter)
}

async fn linearize(
    pipeline: &LinearizationPipeline,
    archive: Vec<u8>,
) -> (String, ProcessingStatistics) {
    let mut out = Vec::new();
    let stats = pipeline
        .linearize(Arc::new(MemoryReader::new(archive)), &mut out)
        .await
        .expect("linearize ok");
    (String::from_utf8(out).expect("output is utf-8"), stats)
}

fn assert_counts_add_up(stats: &ProcessingStatistics) {
    assert_eq!(
        stats.total_files,
        stats.processed_files + stats.skipped_files + stats.failed_files
    );
}

#[tokio::test]
async fn text_entry_and_directory() {
    let archive = ZipBuilder::new().stored("a.txt", b"hi").directory("b/").build();
    let pipeline = LinearizationPipeline::new(settings("|")).unwrap();

    let (output, stats) = linearize(&pipeline, archive).await;

    assert_eq!(output.matches("hi|").count(), 1);
    assert_eq!(output.matches('|').count(), 1);
    assert!(output.starts_with("File: a.txt\n"));
    assert_eq!(stats.processed_files, 1);
    assert_eq!(stats.skipped_files, 1);
    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_bytes_written, 2);
    assert_counts_add_up(&stats);
}

#[tokio::test]
async fn output_layout_follows_archive_order() {
    let archive = ZipBuilder::new()
        .stored("src/z.rs", b"fn z() {}")
        .stored("logo.png", b"\x89PNG")
        .deflated("README.md", b"# Title\n")
        .build();
    let settings = ProcessingSettings {
        header_separator: "==".to_string(),
        ..settings("\n--\n")
    };
    let pipeline = LinearizationPipeline::new(settings).unwrap();

    let (output, stats) = linearize(&pipeline, archive).await;

    assert_eq!(
        output,
        "File: src/z.rs\n==\n\nfn z() {}\n--\nFile: README.md\n==\n\n# Title\n\n--\n"
    );
    assert_eq!(stats.processed_files, 2);
    assert_eq!(stats.skipped_files, 1);
    assert_counts_add_up(&stats);
}

#[tokio::test]
async fn broken_entries_are_recorded_and_the_run_continues() {
    let archive = ZipBuilder::new()
        .stored("one.txt", b"first")
        .corrupt("broken.txt", b"tampered")
        .unsupported("bzip.txt", b"nope")
        .stored("two.txt", b"second")
        .build();
    let pipeline = LinearizationPipeline::new(settings("|")).unwrap();

    let (output, stats) = linearize(&pipeline, archive).await;

    assert!(output.contains("first|"));
    assert!(output.contains("second|"));
    assert!(!output.contains("broken.txt"));
    assert_eq!(stats.total_files, 4);
    assert_eq!(stats.processed_files, 2);
    assert_eq!(stats.failed_files, 2);
    let failed: Vec<_> = stats.errors.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(failed, vec!["broken.txt", "bzip.txt"]);
    assert!(stats.errors[0].reason.contains("CRC-32"));
    assert_counts_add_up(&stats);
}

#[tokio::test]
async fn latin1_content_is_decoded_by_the_fallback() {
    let archive = ZipBuilder::new().stored("legacy.txt", b"caf\xe9").build();
    let pipeline = LinearizationPipeline::new(settings("")).unwrap();

    let (output, stats) = linearize(&pipeline, archive).await;

    assert!(output.ends_with("café"));
    assert_eq!(stats.total_bytes_written, "café".len() as u64);
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let archive = ZipBuilder::new()
        .stored("a.txt", b"alpha")
        .directory("dir/")
        .deflated("dir/b.py", b"print('beta')")
        .corrupt("dir/c.txt", b"gamma")
        .build();
    let pipeline = LinearizationPipeline::new(ProcessingSettings::default()).unwrap();

    let first = linearize(&pipeline, archive.clone()).await;
    let second = linearize(&pipeline, archive).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn extra_extensions_widen_the_classifier() {
    let archive = ZipBuilder::new().stored("api.proto", b"syntax = \"proto3\";").build();

    let default = LinearizationPipeline::new(settings("|")).unwrap();
    let (_, stats) = linearize(&default, archive.clone()).await;
    assert_eq!(stats.skipped_files, 1);

    let widened = LinearizationPipeline::new(ProcessingSettings {
        extra_extensions: BTreeSet::from([".proto".to_string()]),
        ..settings("|")
    })
    .unwrap();
    let (_, stats) = linearize(&widened, archive).await;
    assert_eq!(stats.processed_files, 1);
}

#[tokio::test]
async fn unknown_encoding_label_is_a_config_error() {
    let result = LinearizationPipeline::new(ProcessingSettings {
        primary_encoding: "no-such-encoding".to_string(),
        ..ProcessingSettings::default()
    });
    assert!(matches!(result, Err(LinearizeError::Config(_))));
}

struct EverythingIsText;

impl TextClassifier for EverythingIsText {
    fn is_text_file(&self, _name: &str) -> bool {
        true
    }

    fn supported_extensions(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

struct Shouting;

impl ContentDecoder for Shouting {
    fn decode(&self, bytes: &[u8]) -> ziplinear::Result<DecodeResult> {
        if bytes.starts_with(b"\x89PNG") {
            return Err(LinearizeError::Config("refusing image".to_string()));
        }
        Ok(DecodeResult {
            text: String::from_utf8_lossy(bytes).to_uppercase(),
            encoding_used: "shout".to_string(),
        })
    }
}

#[tokio::test]
async fn classifier_and_decoder_are_substitutable() {
    let archive = ZipBuilder::new()
        .stored("data.bin", b"abc")
        .stored("logo.png", b"\x89PNG")
        .directory("d/")
        .build();
    let pipeline = LinearizationPipeline::new(settings("|"))
        .unwrap()
        .with_classifier(EverythingIsText)
        .with_decoder(Shouting);

    let (output, stats) = linearize(&pipeline, archive).await;

    assert!(output.contains("ABC|"));
    assert_eq!(stats.processed_files, 1);
    assert_eq!(stats.failed_files, 1);
    assert_eq!(stats.errors[0].name, "logo.png");
    // Directories are skipped before the classifier is consulted.
    assert_eq!(stats.skipped_files, 1);
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl ProgressReporter for Recorder {
    fn report(&self, processed: usize, skipped: usize) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("progress {processed}/{skipped}"));
    }

    fn report_error(&self, name: &str, _reason: &str) {
        self.calls.lock().unwrap().push(format!("error {name}"));
    }
}

#[tokio::test]
async fn progress_is_reported_per_interval_and_at_the_end() {
    let archive = ZipBuilder::new()
        .stored("1.txt", b"1")
        .stored("2.txt", b"2")
        .corrupt("3.txt", b"3")
        .stored("4.bin", b"4")
        .stored("5.txt", b"5")
        .build();
    let recorder = Recorder::default();
    let pipeline = LinearizationPipeline::new(ProcessingSettings {
        progress_interval: 2,
        ..ProcessingSettings::default()
    })
    .unwrap()
    .with_progress(recorder.clone());

    linearize(&pipeline, archive).await;

    let calls = recorder.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec!["progress 2/0", "error 3.txt", "progress 3/1"]
    );
}

#[tokio::test]
async fn process_writes_the_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("repo.zip");
    std::fs::write(
        &archive_path,
        ZipBuilder::new().stored("main.go", b"package main").build(),
    )
    .unwrap();
    let output = dir.path().join("nested/out/repo.linearized.txt");

    let pipeline = LinearizationPipeline::new(settings("|")).unwrap();
    let reader = Arc::new(LocalFileReader::new(&archive_path).unwrap());
    let stats = pipeline.process(reader, &output).await.unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.ends_with("package main|"));
    assert_eq!(stats.processed_files, 1);
    assert_eq!(stats.archive_size, std::fs::metadata(&archive_path).unwrap().len());
}

#[tokio::test]
async fn out_of_range_entry_offset_fails_only_that_entry() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("broken.zip");
    let archive = ZipBuilder::new()
        .misplaced("a.txt", b"lost", u64::MAX - 4)
        .stored("b.txt", b"found")
        .build();
    std::fs::write(&archive_path, archive).unwrap();
    let output = dir.path().join("out.txt");

    let pipeline = LinearizationPipeline::new(settings("|")).unwrap();
    let reader = Arc::new(LocalFileReader::new(&archive_path).unwrap());
    let stats = pipeline.process(reader, &output).await.unwrap();

    assert_eq!(stats.failed_files, 1);
    assert_eq!(stats.processed_files, 1);
    assert_eq!(stats.errors[0].name, "a.txt");
    assert_counts_add_up(&stats);
    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.ends_with("found|"));
    assert!(!written.contains("File: a.txt"));
}

#[tokio::test]
async fn invalid_archive_aborts_without_creating_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    let pipeline = LinearizationPipeline::new(ProcessingSettings::default()).unwrap();

    for bytes in [Vec::new(), b"PK but not really".to_vec()] {
        let err = pipeline
            .process(Arc::new(MemoryReader::new(bytes)), &output)
            .await
            .unwrap_err();
        assert!(matches!(err, LinearizeError::ArchiveOpen(_)), "{err}");
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn unwritable_output_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file cannot act as the parent directory.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let output = blocker.join("out.txt");

    let archive = ZipBuilder::new().stored("a.txt", b"hi").build();
    let pipeline = LinearizationPipeline::new(ProcessingSettings::default()).unwrap();
    let err = pipeline
        .process(Arc::new(MemoryReader::new(archive)), &output)
        .await
        .unwrap_err();
    assert!(matches!(err, LinearizeError::OutputWrite(_)), "{err}");
}
