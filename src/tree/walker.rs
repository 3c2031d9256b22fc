//! Filesystem walker enumerating the regular files of a scan root

use crate::error::StorageError;
use crate::tree::path;
use crate::types::FileFailure;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Paths left out of hashing and classification
///
/// File names match the last segment of a relative path exactly. Folder
/// prefixes match the start of a relative path as plain text, so `cache`
/// covers `cache/x` and `cache_old/x` while `cache/` covers only `cache/x`.
/// Exact paths exclude a single key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    file_names: BTreeSet<String>,
    folders: Vec<String>,
    paths: BTreeSet<String>,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configured lists of file names and folder prefixes
    pub fn from_lists<F, D>(file_names: F, folders: D) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let mut exclusions = Self::new();
        for name in file_names {
            exclusions.add_file_name(name);
        }
        for folder in folders {
            exclusions.add_folder(folder);
        }
        exclusions
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.add_file_name(name);
        self
    }

    pub fn with_folder(mut self, prefix: impl Into<String>) -> Self {
        self.add_folder(prefix);
        self
    }

    pub fn with_path(mut self, key: impl Into<String>) -> Self {
        self.add_path(key);
        self
    }

    pub fn add_file_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.file_names.insert(name);
        }
    }

    /// Add a folder prefix; `\` is read as a separator and leading
    /// separators are dropped
    pub fn add_folder(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into().replace('\\', "/");
        let prefix = prefix.trim_start_matches(path::SEPARATOR).to_string();
        if !prefix.is_empty() && !self.folders.contains(&prefix) {
            self.folders.push(prefix);
        }
    }

    /// Exclude exactly one manifest key
    pub fn add_path(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !key.is_empty() {
            self.paths.insert(key);
        }
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn excludes_file_name(&self, key: &str) -> bool {
        self.file_names.contains(path::file_name(key))
    }

    pub fn excludes_folder(&self, key: &str) -> bool {
        self.folders.iter().any(|prefix| key.starts_with(prefix.as_str()))
    }

    /// Whether a relative path is excluded by any rule
    pub fn excludes(&self, key: &str) -> bool {
        self.paths.contains(key) || self.excludes_folder(key) || self.excludes_file_name(key)
    }

    /// Whether every path below directory `key` is excluded by a folder prefix
    fn prunes_dir(&self, key: &str) -> bool {
        let dir = format!("{}{}", key, path::SEPARATOR);
        self.folders.iter().any(|prefix| dir.starts_with(prefix.as_str()))
    }
}

/// A regular file found under the scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Manifest key: `/`-separated, NFC-normalized, relative to the root
    pub relative: String,
}

/// A regular file whose path cannot be written as a manifest key
#[derive(Debug)]
pub struct UnusablePath {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Lossy relative rendering, for reports
    pub display: String,
    pub error: StorageError,
}

impl UnusablePath {
    pub fn to_failure(&self) -> FileFailure {
        FileFailure {
            path: self.display.clone(),
            error: self.error.to_string(),
        }
    }
}

/// Filesystem walker
///
/// Entries are sorted by file name within each directory, so two passes over
/// an unchanged tree produce the same sequence. Symbolic links are not
/// followed.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    exclusions: Exclusions,
}

impl Walker {
    /// Create a walker for `root`. Fails if `root` is not a readable directory.
    pub fn new(root: &Path, exclusions: Exclusions) -> Result<Self, StorageError> {
        Ok(Self {
            root: path::canonicalize_root(root)?,
            exclusions,
        })
    }

    /// Canonical scan root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    /// Lazily enumerate the files under the root
    ///
    /// Unreadable directories and entries are skipped with a warning. Files
    /// whose names cannot become manifest keys are yielded as errors so the
    /// caller can record them.
    pub fn entries(&self) -> impl Iterator<Item = Result<WalkEntry, UnusablePath>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_pruned(entry))
            .filter_map(move |result| match result {
                Ok(entry) => self.accept(entry),
                Err(e) => {
                    warn!(
                        path = ?e.path(),
                        error = %e,
                        "Skipping unreadable entry"
                    );
                    None
                }
            })
    }

    /// Number of files a full pass would yield
    pub fn count(&self) -> usize {
        self.entries().count()
    }

    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        match path::relative_key(&self.root, entry.path()) {
            Ok(key) if self.exclusions.prunes_dir(&key) => {
                trace!(path = %key, "Pruned excluded folder");
                true
            }
            _ => false,
        }
    }

    fn accept(&self, entry: DirEntry) -> Option<Result<WalkEntry, UnusablePath>> {
        if !entry.file_type().is_file() {
            return None;
        }

        let relative = match path::relative_key(&self.root, entry.path()) {
            Ok(key) => key,
            Err(error) => {
                let name = entry.file_name().to_string_lossy();
                if self.exclusions.file_names.contains(name.as_ref()) {
                    return None;
                }
                let display = self.lossy_relative(entry.path());
                if self.exclusions.excludes(&display) {
                    return None;
                }
                let shown = &display;
                warn!(path = %shown, error = %error, "File name cannot be a manifest key");
                return Some(Err(UnusablePath {
                    path: entry.into_path(),
                    display,
                    error,
                }));
            }
        };

        if self.exclusions.excludes(&relative) {
            trace!(path = %relative, "Skipped excluded path");
            return None;
        }

        Some(Ok(WalkEntry {
            path: entry.into_path(),
            relative,
        }))
    }

    fn lossy_relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}
