//! Error types for repository operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while resolving and fetching kernel modules.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A network fetch returned a non-success status.
    #[error("request to {path} failed with status {status}")]
    Transport { path: String, status: u16 },

    /// A network fetch failed before a status was available.
    #[error("request to {path} failed: {reason}")]
    Request { path: String, reason: String },

    /// Failed to construct the HTTP client.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Digest verification failed at a transport boundary.
    #[error("checksum mismatch for {label}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        label: String,
        expected: String,
        actual: String,
    },

    /// A compressed payload was not validly framed.
    #[error("failed to decompress {label}: {source}")]
    Decode {
        label: String,
        #[source]
        source: io::Error,
    },

    /// A metadata document was malformed or incomplete.
    #[error("failed to parse {context}: {reason}")]
    MetadataParse { context: String, reason: String },

    /// The requested manifest category is absent from the repository index.
    #[error("manifest type {manifest_type:?} not present in repository index")]
    ManifestTypeNotFound { manifest_type: String },

    /// The requested kernel version is absent from the resolved manifest.
    #[error("no kernel module for version {kernel_version:?} in {url}")]
    ModuleNotFound { kernel_version: String, url: String },

    /// Failed to read a local file.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a local file.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let err = RepositoryError::Transport {
            path: "http://repo.example.com/repodata/repomd.xml".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "request to http://repo.example.com/repodata/repomd.xml failed with status 404"
        );
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = RepositoryError::ChecksumMismatch {
            label: "kernel.xml.gz".to_string(),
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        assert!(err.to_string().contains("checksum mismatch"));
        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("def456"));
    }

    #[test]
    fn test_module_not_found_display() {
        let err = RepositoryError::ModuleNotFound {
            kernel_version: "5.4.0-generic".to_string(),
            url: "http://repo.example.com".to_string(),
        };
        assert!(err.to_string().contains("5.4.0-generic"));
        assert!(err.to_string().contains("http://repo.example.com"));
    }
}
