//! Hashsweep: Checksum Manifests and Drift Quarantine
//!
//! Walks a directory tree, records a SHA-256 digest for every file in a JSON
//! manifest, and later sorts a tree against a reference manifest, moving files
//! whose content changed or that the manifest does not know into quarantine
//! folders.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod progress;
pub mod tree;
pub mod types;
