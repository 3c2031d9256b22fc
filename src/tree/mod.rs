//! Directory tree access
//!
//! Hashing of file content, path normalization into manifest keys, and the
//! deterministic walk that feeds both the manifest builder and the classifier.

pub mod hasher;
pub mod path;
pub mod walker;
