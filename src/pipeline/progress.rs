/// Receives progress while the pipeline runs.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, processed: usize, skipped: usize);

    fn report_error(&self, name: &str, reason: &str);
}

/// Reports through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, processed: usize, skipped: usize) {
        log::info!("Processed files: {}, skipped: {}", processed, skipped);
    }

    fn report_error(&self, name: &str, reason: &str) {
        log::warn!("Error reading {}: {}", name, reason);
    }
}
