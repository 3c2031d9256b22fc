//! Moving files out of the live tree into quarantine folders

use crate::error::StorageError;
use crate::tree::path::SEPARATOR;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for `relative` under `dir`, mirroring its subdirectories
pub fn destination_for(dir: &Path, relative: &str) -> PathBuf {
    relative
        .split(SEPARATOR)
        .fold(dir.to_path_buf(), |acc, segment| acc.join(segment))
}

/// First of `path`, `path.1`, `path.2`, ... that does not exist yet
pub fn unique_destination(path: PathBuf) -> PathBuf {
    if fs::symlink_metadata(&path).is_err() {
        return path;
    }

    let name = path.file_name().unwrap_or_default().to_os_string();
    let mut n: u64 = 0;
    loop {
        n += 1;
        let mut candidate_name = name.clone();
        candidate_name.push(format!(".{}", n));
        let candidate = path.with_file_name(candidate_name);
        if fs::symlink_metadata(&candidate).is_err() {
            return candidate;
        }
    }
}

/// Move `from` into `dir` at its relative path, never overwriting
///
/// Returns the final destination.
pub fn relocate(from: &Path, dir: &Path, relative: &str) -> Result<PathBuf, StorageError> {
    let destination = unique_destination(destination_for(dir, relative));
    move_file(from, &destination)?;
    Ok(destination)
}

/// Rename `from` to `to`, falling back to copy + delete across filesystems
///
/// The source is only removed once a complete copy exists; on any failure it
/// stays in place.
pub fn move_file(from: &Path, to: &Path) -> Result<(), StorageError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::create_dir(parent, e))?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            debug!(from = %from.display(), to = %to.display(), "Rename crosses devices, copying");
            copy_then_remove(from, to)
        }
        Err(e) => Err(move_error(from, to, e)),
    }
}

/// Copy `from` to `to`, then delete `from`
pub fn copy_then_remove(from: &Path, to: &Path) -> Result<(), StorageError> {
    if let Err(e) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(move_error(from, to, e));
    }

    if let Err(e) = fs::remove_file(from) {
        // Keep exactly one copy: the original.
        let _ = fs::remove_file(to);
        return Err(move_error(from, to, e));
    }

    Ok(())
}

fn move_error(from: &Path, to: &Path, source: io::Error) -> StorageError {
    StorageError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    // EXDEV
    e.raw_os_error() == Some(18)
}

#[cfg(windows)]
fn is_cross_device(e: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    e.raw_os_error() == Some(17)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_e: &io::Error) -> bool {
    false
}
