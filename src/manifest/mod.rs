//! Manifest: the known-good path -> digest mapping of a directory tree
//!
//! Stored as a pretty-printed JSON object keyed by `/`-separated relative
//! paths. Keys are kept sorted so two builds of the same tree serialize to
//! identical bytes.

pub mod builder;

use crate::error::{ApiError, FormatError, StorageError};
use crate::tree::path;
use crate::types::Digest;
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::path::Path;

pub use builder::{BuildReport, ManifestBuilder};

/// Indentation used when writing manifest files
const JSON_INDENT: &[u8] = b"    ";

/// Relative path -> content digest mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, Digest>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, normalizing and validating the key
    ///
    /// Returns the previous digest if the key was already present.
    pub fn insert(&mut self, key: &str, digest: Digest) -> Result<Option<Digest>, FormatError> {
        let key = path::normalize_key(key).map_err(|reason| FormatError::InvalidKey {
            key: key.to_string(),
            reason,
        })?;
        Ok(self.entries.insert(key, digest))
    }

    pub fn get(&self, key: &str) -> Option<&Digest> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Digest> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Parse manifest JSON, validating every key and digest
    pub fn from_json_str(json: &str) -> Result<Self, FormatError> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut manifest = Manifest::new();
        for (key, value) in raw {
            let hex = value.as_str().ok_or_else(|| FormatError::InvalidDigest {
                key: key.clone(),
                reason: format!("expected a hex string, got {}", value),
            })?;
            let digest = Digest::from_hex(hex).map_err(|reason| FormatError::InvalidDigest {
                key: key.clone(),
                reason,
            })?;
            let normalized = path::normalize_key(&key)
                .map_err(|reason| FormatError::InvalidKey { key: key.clone(), reason })?;
            if manifest.entries.insert(normalized.clone(), digest).is_some() {
                return Err(FormatError::DuplicateKey(normalized));
            }
        }

        Ok(manifest)
    }

    /// Serialize as a 4-space indented JSON object with sorted keys
    pub fn to_json_string(&self) -> Result<String, FormatError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| FormatError::Json(serde::ser::Error::custom(e)))
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let contents = fs::read_to_string(path).map_err(|e| StorageError::read(path, e))?;
        Ok(Self::from_json_str(&contents)?)
    }

    /// Write the manifest to `path`
    ///
    /// The JSON goes to a sibling temporary file first and is renamed into
    /// place, so an interrupted write never leaves a truncated manifest.
    pub fn save(&self, path: &Path) -> Result<(), ApiError> {
        let json = self.to_json_string()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::create_dir(parent, e))?;
        }

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        fs::write(&tmp_path, json).map_err(|e| StorageError::write(&tmp_path, e))?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::write(path, e).into());
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a String, &'a Digest);
    type IntoIter = btree_map::Iter<'a, String, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
