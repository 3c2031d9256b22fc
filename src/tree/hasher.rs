//! Streaming SHA-256 computation for file contents

use crate::error::StorageError;
use crate::types::{Digest, DIGEST_LEN};
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read block size. Bounds memory use independent of file size.
pub const BLOCK_SIZE: usize = 4096;

/// Compute the content digest of a file
///
/// The file is streamed in `BLOCK_SIZE` blocks; only its bytes contribute to
/// the digest, never its metadata.
pub fn hash_file(path: &Path) -> Result<Digest, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::read(path, e))?;
    hash_reader(file).map_err(|e| StorageError::read(path, e))
}

/// Compute the digest of everything remaining in `reader`
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<Digest> {
    let mut hasher = Sha256::new();
    let mut block = [0u8; BLOCK_SIZE];

    loop {
        let n = match reader.read(&mut block) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&block[..n]);
    }

    Ok(finish(hasher))
}

/// Compute the digest of in-memory content
pub fn hash_bytes(content: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(content);
    finish(hasher)
}

fn finish(hasher: Sha256) -> Digest {
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&hasher.finalize());
    Digest::from_bytes(bytes)
}
