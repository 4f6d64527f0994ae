//! SHA-256 content verification for downloaded archives.

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

use crate::error::ProvisionError;

/// Chunk size for reading files during hashing (1MB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Compute the sha256 of a file as lowercase hex.
pub fn sha256_file(file: &Path) -> Result<String, std::io::Error> {
    let mut f = std::fs::File::open(file)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = f.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify a file's sha256 against an expected value (case-insensitive).
///
/// The remote hosts are not trusted infrastructure; a mismatch is always
/// fatal and never silently ignored.
pub fn verify_sha256(file: &Path, expected: &str) -> Result<(), ProvisionError> {
    let expected = expected.to_lowercase();
    let actual = sha256_file(file)?;

    if actual != expected {
        return Err(ProvisionError::Integrity {
            path: file.to_path_buf(),
            expected,
            actual,
        });
    }

    Ok(())
}
