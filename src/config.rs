//! Configuration System
//!
//! Layered configuration: built-in defaults, the user config file, the
//! workspace `hashsweep.toml`, then `HASHSWEEP_*` environment variables.
//! CLI flags are applied on top by the command router.

use crate::fetch::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MANIFEST_URL};
use crate::logging::LoggingConfig;
use crate::tree::walker::Exclusions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// File and folder name reserved for the game client's local storage
pub const LOCAL_STORAGE: &str = ".local_storage";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Exclusions shared by both pipelines
    #[serde(default)]
    pub scan: ScanConfig,

    /// Generator settings
    #[serde(default)]
    pub generate: GenerateConfig,

    /// Verifier settings
    #[serde(default)]
    pub verify: VerifyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Exact file names skipped anywhere in the tree
    pub exclude_files: Vec<String>,
    /// Relative folder prefixes skipped entirely
    pub exclude_folders: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_files: vec![LOCAL_STORAGE.to_string()],
            exclude_folders: vec![LOCAL_STORAGE.to_string()],
        }
    }
}

impl ScanConfig {
    pub fn exclusions(&self) -> Exclusions {
        Exclusions::from_lists(self.exclude_files.iter().cloned(), self.exclude_folders.iter().cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Where the manifest is written
    pub output: PathBuf,
    /// Skip unreadable files instead of aborting
    pub keep_going: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("hashes.json"),
            keep_going: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Reference manifest location
    pub manifest_url: String,
    /// Local copy of the downloaded manifest
    pub manifest_file: PathBuf,
    pub outdated_dir: PathBuf,
    pub unknown_dir: PathBuf,
    pub fetch_timeout_secs: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            manifest_file: PathBuf::from("hashes.json"),
            outdated_dir: PathBuf::from("outdated"),
            unknown_dir: PathBuf::from("unknown"),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
        }
    }
}

impl VerifyConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Scan(String),
    Generate(String),
    Verify(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Scan(msg) => write!(f, "scan: {}", msg),
            ValidationError::Generate(msg) => write!(f, "generate: {}", msg),
            ValidationError::Verify(msg) => write!(f, "verify: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SweepConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.scan.exclude_files.iter().any(|name| name.contains('/')) {
            errors.push(ValidationError::Scan(
                "exclude_files entries are file names and cannot contain '/'".to_string(),
            ));
        }

        if self.generate.output.as_os_str().is_empty() {
            errors.push(ValidationError::Generate("output path cannot be empty".to_string()));
        }

        let verify = &self.verify;
        if !(verify.manifest_url.starts_with("http://") || verify.manifest_url.starts_with("https://")) {
            errors.push(ValidationError::Verify(format!(
                "manifest_url must be an http(s) URL, got {:?}",
                verify.manifest_url
            )));
        }
        if verify.manifest_file.as_os_str().is_empty() {
            errors.push(ValidationError::Verify("manifest_file cannot be empty".to_string()));
        }
        if verify.outdated_dir.as_os_str().is_empty() || verify.unknown_dir.as_os_str().is_empty() {
            errors.push(ValidationError::Verify(
                "quarantine folders cannot be empty".to_string(),
            ));
        } else if verify.outdated_dir == verify.unknown_dir {
            errors.push(ValidationError::Verify(
                "outdated_dir and unknown_dir must differ".to_string(),
            ));
        }
        if verify.fetch_timeout_secs == 0 {
            errors.push(ValidationError::Verify(
                "fetch_timeout_secs must be positive".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
