//! Hasher Implementation Verification Tests
//!
//! Digests must be plain SHA-256 of file content, independent of how the file
//! is split into read blocks.

use hashsweep::tree::hasher::{self, BLOCK_SIZE};
use hashsweep::types::Digest;
use proptest::prelude::*;
use sha2::{Digest as _, Sha256};
use std::fs;
use tempfile::TempDir;

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

#[test]
fn test_known_vectors() {
    assert_eq!(hasher::hash_bytes(b"").to_hex(), EMPTY_SHA256);
    assert_eq!(hasher::hash_bytes(b"hello").to_hex(), HELLO_SHA256);
    assert_eq!(hasher::hash_bytes(b"abc").to_hex(), ABC_SHA256);
}

/// Empty files hash to the digest of the empty string
#[test]
fn test_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("empty");
    fs::write(&file, b"").unwrap();

    assert_eq!(hasher::hash_file(&file).unwrap().to_hex(), EMPTY_SHA256);
}

#[test]
fn test_file_matches_sha2_directly() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("large.bin");
    let content: Vec<u8> = (0..(BLOCK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
    fs::write(&file, &content).unwrap();

    let expected = Sha256::digest(&content);
    assert_eq!(hasher::hash_file(&file).unwrap().as_bytes().as_slice(), expected.as_slice());
}

#[test]
fn test_missing_file_is_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = hasher::hash_file(&temp_dir.path().join("nope")).unwrap_err();
    assert!(err.to_string().contains("nope"));
}

proptest! {
    /// Flipping any single byte changes the digest
    #[test]
    fn prop_single_byte_change_detected(
        content in proptest::collection::vec(any::<u8>(), 1..(BLOCK_SIZE * 2)),
        index in any::<proptest::sample::Index>(),
    ) {
        let mut changed = content.clone();
        let i = index.index(changed.len());
        changed[i] ^= 0x01;
        prop_assert_ne!(hasher::hash_bytes(&content), hasher::hash_bytes(&changed));
    }

    /// Streaming in blocks yields the same digest as hashing in one shot
    #[test]
    fn prop_streaming_matches_one_shot(content in proptest::collection::vec(any::<u8>(), 0..(BLOCK_SIZE * 3))) {
        let streamed = hasher::hash_reader(content.as_slice()).unwrap();
        prop_assert_eq!(streamed, hasher::hash_bytes(&content));
    }

    #[test]
    fn prop_hex_roundtrip(bytes in any::<[u8; 32]>()) {
        let digest = Digest::from_bytes(bytes);
        prop_assert_eq!(Digest::from_hex(&digest.to_hex()).unwrap(), digest);
        prop_assert_eq!(Digest::from_hex(&digest.to_hex().to_uppercase()).unwrap(), digest);
    }
}
