//! Core types shared by the generator and verifier pipelines.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Length of a SHA-256 digest in bytes
pub const DIGEST_LEN: usize = 32;

/// SHA-256 digest of a file's contents, rendered as lowercase hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, String> {
        if s.len() != DIGEST_LEN * 2 {
            return Err(format!(
                "expected {} hex characters, got {}",
                DIGEST_LEN * 2,
                s.len()
            ));
        }
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| format!("invalid hex: {}", e))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Outcome of comparing a live file against the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Present in the manifest with an equal digest
    Matched,
    /// Present in the manifest with a different digest
    Outdated,
    /// Absent from the manifest
    Unknown,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Matched => "matched",
            Outcome::Outdated => "outdated",
            Outcome::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A single file that could not be hashed or relocated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// Path relative to the scanned root
    pub path: String,
    pub error: String,
}
