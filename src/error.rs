//! Error types for the hashsweep generator and verifier.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem errors: unreadable files, uncreatable directories, failed moves
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StorageError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

/// Manifest content that is not a well-formed path -> digest mapping
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid manifest key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Invalid digest for {key:?}: {reason}")]
    InvalidDigest { key: String, reason: String },

    #[error("Duplicate manifest key after normalization: {0:?}")]
    DuplicateKey(String),
}

/// Remote manifest download failures
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Top-level error surfaced by pipelines and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    StorageError(#[from] StorageError),

    #[error("{0}")]
    FormatError(#[from] FormatError),

    #[error("{0}")]
    NetworkError(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input error: {0}")]
    InputError(String),
}

impl ApiError {
    /// Stable short label for the error category, used in CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::StorageError(_) => "io",
            ApiError::FormatError(_) => "format",
            ApiError::NetworkError(_) => "network",
            ApiError::ConfigError(_) => "config",
            ApiError::InputError(_) => "input",
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
