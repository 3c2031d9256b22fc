//! Manifest builder: walk a directory and hash every file

use crate::error::{ApiError, FormatError};
use crate::manifest::Manifest;
use crate::progress::ProgressReporter;
use crate::tree::hasher;
use crate::tree::walker::{Exclusions, Walker};
use crate::types::FileFailure;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Result of a generator run
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest: Manifest,
    /// Files hashed into the manifest
    pub hashed: usize,
    /// Files skipped because they could not be read (keep-going mode only)
    pub failures: Vec<FileFailure>,
}

/// Builds a fresh manifest for a directory tree
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    root: PathBuf,
    exclusions: Exclusions,
    keep_going: bool,
}

impl ManifestBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclusions: Exclusions::new(),
            keep_going: false,
        }
    }

    pub fn with_exclusions(mut self, exclusions: Exclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Record unreadable files and continue instead of aborting the build
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Walk the root, hash every non-excluded file, and collect the manifest
    ///
    /// Without keep-going, the first unreadable file aborts the build.
    #[instrument(skip(self, progress), fields(root = %self.root.display()))]
    pub fn build(&self, progress: &mut dyn ProgressReporter) -> Result<BuildReport, ApiError> {
        let start = Instant::now();
        let walker = Walker::new(&self.root, self.exclusions.clone())?;

        let total = walker.count();
        progress.start(total);

        let mut manifest = Manifest::new();
        let mut failures = Vec::new();
        let mut scanned = 0;

        for item in walker.entries() {
            scanned += 1;
            let entry = match item {
                Ok(entry) => entry,
                Err(unusable) if self.keep_going => {
                    failures.push(unusable.to_failure());
                    progress.file(scanned, total, &unusable.display);
                    continue;
                }
                Err(unusable) => {
                    error!(path = %unusable.display, "Manifest build aborted");
                    return Err(unusable.error.into());
                }
            };

            if manifest.contains(&entry.relative) {
                let e = FormatError::DuplicateKey(entry.relative.clone());
                if !self.keep_going {
                    error!(path = %entry.relative, "Manifest build aborted");
                    return Err(e.into());
                }
                warn!(path = %entry.relative, "Two files share one manifest key");
                failures.push(FileFailure {
                    path: entry.relative.clone(),
                    error: e.to_string(),
                });
                progress.file(scanned, total, &entry.relative);
                continue;
            }

            match hasher::hash_file(&entry.path) {
                Ok(digest) => {
                    debug!(path = %entry.relative, digest = %digest, "Hashed file");
                    manifest.insert(&entry.relative, digest)?;
                }
                Err(e) if self.keep_going => {
                    warn!(path = %entry.relative, error = %e, "Skipping unreadable file");
                    failures.push(FileFailure {
                        path: entry.relative.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    error!(path = %entry.relative, error = %e, "Manifest build aborted");
                    return Err(e.into());
                }
            }
            progress.file(scanned, total, &entry.relative);
        }
        progress.finish(scanned);

        let hashed = manifest.len();
        info!(
            hashed,
            failed = failures.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Manifest built"
        );

        Ok(BuildReport {
            manifest,
            hashed,
            failures,
        })
    }
}
