//! Relative path normalization for manifest keys

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonical separator used in manifest keys
pub const SEPARATOR: char = '/';

/// Resolve a scan root to an absolute, symlink-free path
///
/// Uses dunce so Windows paths come back without the `\\?\` prefix.
pub fn canonicalize_root(root: &Path) -> Result<PathBuf, StorageError> {
    let canonical = dunce::canonicalize(root).map_err(|e| StorageError::read(root, e))?;
    if !canonical.is_dir() {
        return Err(StorageError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    Ok(canonical)
}

/// Compute the manifest key for `path` under `root`
///
/// Joins the normal components with `/` and normalizes Unicode to NFC, so the
/// same tree yields the same keys on every platform. The result is always in
/// the form `normalize_key` returns; names that cannot round-trip through a
/// manifest (non-UTF-8, containing `\`, drive-like `c:` prefixes) are errors.
pub fn relative_key(root: &Path, path: &Path) -> Result<String, StorageError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        StorageError::InvalidPath(format!(
            "{} is not under {}",
            path.display(),
            root.display()
        ))
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name.to_str().ok_or_else(|| {
                    StorageError::InvalidPath(format!("{} is not valid UTF-8", path.display()))
                })?;
                segments.push(name.nfc().collect::<String>());
            }
            Component::CurDir => {}
            _ => {
                return Err(StorageError::InvalidPath(format!(
                    "{} escapes the scan root",
                    path.display()
                )))
            }
        }
    }

    if segments.is_empty() {
        return Err(StorageError::InvalidPath(format!(
            "{} has no path relative to the root",
            path.display()
        )));
    }

    let key = segments.join("/");
    match normalize_key(&key) {
        Ok(normalized) if normalized == key => Ok(key),
        Ok(normalized) => Err(StorageError::InvalidPath(format!(
            "{} would be stored as {:?} in a manifest",
            path.display(),
            normalized
        ))),
        Err(reason) => Err(StorageError::InvalidPath(format!(
            "{} cannot be a manifest key: {}",
            path.display(),
            reason
        ))),
    }
}

/// Manifest key of `path` if it lies inside `root`
///
/// `path` need not exist; relative paths resolve against the current
/// directory. `root` must already be canonical.
pub fn key_within(root: &Path, path: &Path) -> Option<String> {
    let resolved = resolve(path).ok()?;
    relative_key(root, &resolved).ok()
}

/// Absolute form of `path` with its deepest existing ancestor canonicalized
///
/// `path` need not exist; relative paths resolve against the current directory.
pub fn resolve(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut ancestor = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        match dunce::canonicalize(ancestor) {
            Ok(canonical) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(canonical, |acc: PathBuf, name| acc.join(name)));
            }
            Err(e) => match (ancestor.parent(), ancestor.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    ancestor = parent;
                }
                _ => return Err(e),
            },
        }
    }
}

/// Normalize a key read from an external manifest
///
/// Accepts `\` separators and decomposed Unicode. Rejects absolute keys,
/// empty segments, `.` and `..`.
pub fn normalize_key(key: &str) -> Result<String, String> {
    if key.is_empty() {
        return Err("key is empty".to_string());
    }
    let unified: String = key.replace('\\', "/").nfc().collect();
    if unified.starts_with(SEPARATOR) {
        return Err("key must be relative (leading separator)".to_string());
    }
    let bytes = unified.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Err("key must be relative (drive prefix)".to_string());
    }
    for segment in unified.split(SEPARATOR) {
        match segment {
            "" => return Err("key contains an empty segment".to_string()),
            "." | ".." => return Err(format!("key contains a {:?} segment", segment)),
            _ => {}
        }
    }
    Ok(unified)
}

/// Last segment of a manifest key
pub fn file_name(key: &str) -> &str {
    key.rsplit(SEPARATOR).next().unwrap_or(key)
}
