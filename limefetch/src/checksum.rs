//! SHA-256 checksum calculation and verification.
//!
//! Every payload fetched from the repository is verified against the
//! checksum its metadata declares before it is parsed or returned.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{RepositoryError, RepositoryResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the lowercase hexadecimal SHA-256 digest of a byte slice.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Verify a payload against its declared checksum.
///
/// The comparison is case-sensitive. `label` identifies the payload in the
/// error and in logs, typically the repository-relative file path.
///
/// # Errors
///
/// Returns [`RepositoryError::ChecksumMismatch`] carrying the label, the
/// expected digest, and the digest actually computed.
pub fn verify_checksum(data: &[u8], expected: &str, label: &str) -> RepositoryResult<()> {
    let actual = sha256_hex(data);
    debug!(%label, checksum = %actual, "calculated checksum");
    if actual != expected {
        return Err(RepositoryError::ChecksumMismatch {
            label: label.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Verify a file's contents against a declared checksum.
///
/// Same contract as [`verify_checksum`], reading the file in buffered
/// chunks rather than loading it whole.
///
/// # Errors
///
/// Returns [`RepositoryError::ChecksumMismatch`] on a digest mismatch, or
/// [`RepositoryError::ReadFailed`] if the file cannot be read.
pub fn verify_file_checksum(path: &Path, expected: &str, label: &str) -> RepositoryResult<()> {
    let actual = file_sha256(path)?;
    debug!(%label, checksum = %actual, "calculated checksum");
    if actual != expected {
        return Err(RepositoryError::ChecksumMismatch {
            label: label.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Calculate the SHA-256 digest of a file's contents.
///
/// Reads the file in buffered chunks rather than loading it whole.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_sha256(path: &Path) -> RepositoryResult<String> {
    let mut file = File::open(path).map_err(|e| RepositoryError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| RepositoryError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
