//! Classifier: compare a live tree against a manifest and quarantine drift
//!
//! Every live file is `Matched`, `Outdated` (listed with a different digest)
//! or `Unknown` (not listed). Outdated and unknown files are moved out of the
//! tree into their quarantine folder at the same relative path. A file that
//! cannot be hashed or moved is recorded and the run continues.

pub mod relocate;

use crate::error::{ApiError, StorageError};
use crate::manifest::Manifest;
use crate::progress::ProgressReporter;
use crate::tree::hasher;
use crate::tree::path;
use crate::tree::walker::{Exclusions, WalkEntry, Walker};
use crate::types::{FileFailure, Outcome};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Destination folders for drifted files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quarantine {
    pub outdated_dir: PathBuf,
    pub unknown_dir: PathBuf,
}

impl Quarantine {
    pub fn new(outdated_dir: impl Into<PathBuf>, unknown_dir: impl Into<PathBuf>) -> Self {
        Self {
            outdated_dir: outdated_dir.into(),
            unknown_dir: unknown_dir.into(),
        }
    }

    /// Folder receiving files with `outcome`; matched files stay put.
    pub fn dir_for(&self, outcome: Outcome) -> Option<&Path> {
        match outcome {
            Outcome::Matched => None,
            Outcome::Outdated => Some(&self.outdated_dir),
            Outcome::Unknown => Some(&self.unknown_dir),
        }
    }

    /// Create both folders if absent
    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        for dir in [&self.outdated_dir, &self.unknown_dir] {
            fs::create_dir_all(dir).map_err(|e| StorageError::create_dir(dir, e))?;
        }
        Ok(())
    }
}

/// A file moved (or, in a dry run, due to be moved) out of the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relocation {
    pub path: String,
    pub outcome: Outcome,
    pub destination: PathBuf,
}

/// Result of a verifier run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassifyReport {
    pub matched: usize,
    pub outdated: usize,
    pub unknown: usize,
    pub relocations: Vec<Relocation>,
    pub failures: Vec<FileFailure>,
    /// Manifest entries with no live file
    pub missing: Vec<String>,
    pub dry_run: bool,
}

impl ClassifyReport {
    /// Files classified, whatever the outcome
    pub fn classified(&self) -> usize {
        self.matched + self.outdated + self.unknown
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Matched => self.matched += 1,
            Outcome::Outdated => self.outdated += 1,
            Outcome::Unknown => self.unknown += 1,
        }
    }
}

/// Compares a live directory against a manifest
#[derive(Debug, Clone)]
pub struct Classifier<'m> {
    manifest: &'m Manifest,
    root: PathBuf,
    quarantine: Quarantine,
    exclusions: Exclusions,
    dry_run: bool,
}

impl<'m> Classifier<'m> {
    pub fn new(manifest: &'m Manifest, root: impl Into<PathBuf>, quarantine: Quarantine) -> Self {
        Self {
            manifest,
            root: root.into(),
            quarantine,
            exclusions: Exclusions::new(),
            dry_run: false,
        }
    }

    pub fn with_exclusions(mut self, exclusions: Exclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Classify without creating folders or moving files
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Decide the outcome for one live file
    ///
    /// Only files listed in the manifest are hashed.
    pub fn classify_entry(&self, entry: &WalkEntry) -> Result<Outcome, StorageError> {
        let Some(expected) = self.manifest.get(&entry.relative) else {
            return Ok(Outcome::Unknown);
        };

        let actual = hasher::hash_file(&entry.path)?;
        if &actual == expected {
            Ok(Outcome::Matched)
        } else {
            debug!(
                path = %entry.relative,
                expected = %expected,
                actual = %actual,
                "Digest mismatch"
            );
            Ok(Outcome::Outdated)
        }
    }

    /// Classify every live file and relocate the outdated and unknown ones
    ///
    /// Fails only if the root cannot be read or a quarantine folder cannot be
    /// created; per-file problems land in `ClassifyReport::failures`.
    #[instrument(skip(self, progress), fields(root = %self.root.display(), dry_run = self.dry_run))]
    pub fn run(&self, progress: &mut dyn ProgressReporter) -> Result<ClassifyReport, ApiError> {
        let start = Instant::now();
        let root = path::canonicalize_root(&self.root)?;

        if !self.dry_run {
            self.quarantine.ensure_dirs()?;
        }

        let mut exclusions = self.exclusions.clone();
        for dir in [&self.quarantine.outdated_dir, &self.quarantine.unknown_dir] {
            if path::canonicalize_root(dir).map_or(false, |canonical| canonical == root) {
                return Err(StorageError::InvalidPath(format!(
                    "quarantine folder {} is the scan root",
                    dir.display()
                ))
                .into());
            }
            if let Some(key) = path::key_within(&root, dir) {
                debug!(folder = %key, "Excluding quarantine folder inside scan root");
                exclusions.add_folder(format!("{}{}", key, path::SEPARATOR));
            }
        }

        let walker = Walker::new(&root, exclusions)?;
        let total = walker.count();
        progress.start(total);

        let mut report = ClassifyReport {
            dry_run: self.dry_run,
            ..ClassifyReport::default()
        };
        let mut seen: HashSet<String> = HashSet::new();
        let mut scanned = 0;

        for item in walker.entries() {
            scanned += 1;
            let entry = match item {
                Ok(entry) => entry,
                Err(unusable) => {
                    report.failures.push(unusable.to_failure());
                    progress.file(scanned, total, &unusable.display);
                    continue;
                }
            };
            if self.manifest.contains(&entry.relative) {
                seen.insert(entry.relative.clone());
            }

            match self.classify_entry(&entry) {
                Ok(outcome) => {
                    report.record(outcome);
                    if let Some(dir) = self.quarantine.dir_for(outcome) {
                        self.quarantine_file(&entry, outcome, dir, &mut report);
                    }
                }
                Err(e) => {
                    warn!(path = %entry.relative, error = %e, "Failed to hash file");
                    report.failures.push(FileFailure {
                        path: entry.relative.clone(),
                        error: e.to_string(),
                    });
                }
            }
            progress.file(scanned, total, &entry.relative);
        }
        progress.finish(scanned);

        report.missing = self
            .manifest
            .keys()
            .filter(|key| !seen.contains(*key) && !walker.exclusions().excludes(key))
            .map(str::to_string)
            .collect();

        info!(
            matched = report.matched,
            outdated = report.outdated,
            unknown = report.unknown,
            missing = report.missing.len(),
            failed = report.failures.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Verification complete"
        );

        Ok(report)
    }

    fn quarantine_file(
        &self,
        entry: &WalkEntry,
        outcome: Outcome,
        dir: &Path,
        report: &mut ClassifyReport,
    ) {
        if self.dry_run {
            info!(path = %entry.relative, %outcome, "Would quarantine file");
            report.relocations.push(Relocation {
                path: entry.relative.clone(),
                outcome,
                destination: relocate::destination_for(dir, &entry.relative),
            });
            return;
        }

        match relocate::relocate(&entry.path, dir, &entry.relative) {
            Ok(destination) => {
                info!(
                    path = %entry.relative,
                    %outcome,
                    destination = %destination.display(),
                    "Quarantined file"
                );
                report.relocations.push(Relocation {
                    path: entry.relative.clone(),
                    outcome,
                    destination,
                });
            }
            Err(e) => {
                warn!(path = %entry.relative, error = %e, "Failed to quarantine file");
                report.failures.push(FileFailure {
                    path: entry.relative.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
}
