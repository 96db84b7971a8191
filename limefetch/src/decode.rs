//! Decompression of gzip-framed manifest payloads.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{RepositoryError, RepositoryResult};

/// Decompress a gzip-framed byte stream.
///
/// Pure transformation, no I/O beyond the in-memory stream. `label`
/// identifies the payload in the error, typically its repository path.
///
/// # Errors
///
/// Returns [`RepositoryError::Decode`] if the stream is not validly framed
/// or is truncated.
pub fn gunzip(raw: &[u8], label: &str) -> RepositoryResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(raw);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| RepositoryError::Decode {
            label: label.to_string(),
            source: e,
        })?;
    Ok(decompressed)
}
