//! Progress observability for scans.
//!
//! Pipelines pre-count the files they are about to process and report each
//! file as it is handled. Reporters turn that into log events.

use tracing::{debug, info};

/// Receives per-file progress from the builder and classifier
pub trait ProgressReporter {
    /// Called once before the first file, with the pre-counted total.
    fn start(&mut self, total: usize);

    /// Called after each file is handled.
    fn file(&mut self, scanned: usize, total: usize, path: &str);

    /// Called once after the last file.
    fn finish(&mut self, scanned: usize);
}

/// Reporter that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&mut self, _total: usize) {}
    fn file(&mut self, _scanned: usize, _total: usize, _path: &str) {}
    fn finish(&mut self, _scanned: usize) {}
}

/// Reporter that emits `tracing` events
///
/// Every file is logged at debug; an info event marks each 10% step.
#[derive(Debug, Default)]
pub struct LogProgress {
    last_decile: usize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Percentage of `scanned` over `total`; an empty scan counts as complete.
pub fn percentage(scanned: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (scanned as f64 / total as f64 * 100.0).min(100.0)
}

impl ProgressReporter for LogProgress {
    fn start(&mut self, total: usize) {
        self.last_decile = 0;
        info!(total, "Scanning files");
    }

    fn file(&mut self, scanned: usize, total: usize, path: &str) {
        let percent = percentage(scanned, total);
        debug!(scanned, total, percent = %format!("{:.2}", percent), path, "Scanned");

        let decile = (percent / 10.0) as usize;
        if decile > self.last_decile {
            self.last_decile = decile;
            info!(scanned, total, "Progress {}%", decile * 10);
        }
    }

    fn finish(&mut self, scanned: usize) {
        info!(scanned, "Scan complete");
    }
}
