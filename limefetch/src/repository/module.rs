//! Kernel module download and verification.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::checksum::verify_file_checksum;
use crate::error::{RepositoryError, RepositoryResult};
use crate::metadata::ModuleRecord;
use crate::transport::HttpClient;

/// Downloads a resolved kernel module to local storage.
///
/// The destination filename is derived from the download time and the
/// module's kernel version; it is a naming convention, not a content
/// identifier. The written file is read back and verified against the
/// record's checksum before the path is returned.
#[derive(Debug, Clone)]
pub struct ModuleFetcher {
    output_dir: PathBuf,
}

impl Default for ModuleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleFetcher {
    /// Create a fetcher writing into the current directory.
    pub fn new() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }

    /// Create a fetcher writing into the given directory.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory downloaded modules are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download the module named by `record` and verify it.
    ///
    /// # Errors
    ///
    /// Fails with [`RepositoryError::Transport`] on a non-success status,
    /// [`RepositoryError::WriteFailed`] if the file cannot be written, and
    /// [`RepositoryError::ChecksumMismatch`] if the written bytes do not
    /// match the record's declared checksum.
    pub fn fetch<C: HttpClient>(
        &self,
        client: &C,
        base_url: &str,
        record: &ModuleRecord,
    ) -> RepositoryResult<PathBuf> {
        let filename = destination_filename(&record.version);
        let url = format!("{}/{}", base_url, record.location);
        info!(%url, %filename, "downloading kernel module");

        let body = client.get(&url)?;

        let destination = self.output_dir.join(&filename);
        write_module(&destination, &body)?;

        // Re-reading from disk also catches write corruption.
        verify_file_checksum(&destination, &record.checksum, &record.location)?;

        Ok(destination)
    }
}

/// Write the module bytes, holding the file handle only for the write.
fn write_module(destination: &Path, body: &[u8]) -> RepositoryResult<()> {
    let file = File::create(destination).map_err(|e| RepositoryError::WriteFailed {
        path: destination.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(body)
        .and_then(|_| writer.flush())
        .map_err(|e| RepositoryError::WriteFailed {
            path: destination.to_path_buf(),
            source: e,
        })
}

/// Destination filename: `lime-<UTC ISO-8601 timestamp>-<version>.ko`.
fn destination_filename(version: &str) -> String {
    let datestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S");
    format!("lime-{}-{}.ko", datestamp, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::sha256_hex;
    use crate::transport::tests::MockHttpClient;
    use tempfile::TempDir;

    const BASE_URL: &str = "http://repo.example.com";

    fn record(checksum: &str) -> ModuleRecord {
        ModuleRecord {
            module_type: "lime".to_string(),
            name: "lime-4.4.0-21-generic".to_string(),
            arch: "x86_64".to_string(),
            checksum: checksum.to_string(),
            version: "4.4.0-21-generic".to_string(),
            packager: "ThreatResponse".to_string(),
            location: "modules/lime-4.4.0-21-generic.ko".to_string(),
            signature: "modules/lime-4.4.0-21-generic.ko.sig".to_string(),
            platform: "linux".to_string(),
        }
    }

    #[test]
    fn test_destination_filename_format() {
        let filename = destination_filename("4.4.0-21-generic");
        assert!(filename.starts_with("lime-"));
        assert!(filename.ends_with("-4.4.0-21-generic.ko"));
        // Timestamp portion looks like 2016-06-27T21:22:41
        let timestamp = &filename["lime-".len()..filename.len() - "-4.4.0-21-generic.ko".len()];
        assert_eq!(timestamp.len(), 19);
        assert_eq!(&timestamp[4..5], "-");
        assert_eq!(&timestamp[10..11], "T");
    }

    #[test]
    fn test_fetch_writes_and_verifies() {
        let temp = TempDir::new().unwrap();
        let module_bytes = b"kernel module bytes".to_vec();
        let record = record(&sha256_hex(&module_bytes));

        let mut client = MockHttpClient::new();
        client.insert(format!("{}/{}", BASE_URL, record.location), module_bytes.clone());

        let fetcher = ModuleFetcher::with_output_dir(temp.path());
        let path = fetcher.fetch(&client, BASE_URL, &record).unwrap();

        assert!(path.starts_with(temp.path()));
        assert_eq!(std::fs::read(&path).unwrap(), module_bytes);
    }

    #[test]
    fn test_fetch_checksum_mismatch() {
        let temp = TempDir::new().unwrap();
        let record = record("0000000000000000000000000000000000000000000000000000000000000000");

        let mut client = MockHttpClient::new();
        client.insert(
            format!("{}/{}", BASE_URL, record.location),
            b"tampered bytes".to_vec(),
        );

        let fetcher = ModuleFetcher::with_output_dir(temp.path());
        match fetcher.fetch(&client, BASE_URL, &record) {
            Err(RepositoryError::ChecksumMismatch {
                label, expected, ..
            }) => {
                assert_eq!(label, record.location);
                assert_eq!(expected, record.checksum);
            }
            _ => panic!("expected ChecksumMismatch error"),
        }
    }

    #[test]
    fn test_fetch_transport_failure() {
        let temp = TempDir::new().unwrap();
        let record = record("abc");
        let client = MockHttpClient::new();

        let fetcher = ModuleFetcher::with_output_dir(temp.path());
        match fetcher.fetch(&client, BASE_URL, &record) {
            Err(RepositoryError::Transport { path, status }) => {
                assert_eq!(path, format!("{}/{}", BASE_URL, record.location));
                assert_eq!(status, 404);
            }
            _ => panic!("expected Transport error"),
        }
        // Nothing written on a failed GET
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_fetch_write_failure() {
        let module_bytes = b"kernel module bytes".to_vec();
        let record = record(&sha256_hex(&module_bytes));

        let mut client = MockHttpClient::new();
        client.insert(format!("{}/{}", BASE_URL, record.location), module_bytes);

        let fetcher = ModuleFetcher::with_output_dir("/nonexistent/output/dir");
        assert!(matches!(
            fetcher.fetch(&client, BASE_URL, &record),
            Err(RepositoryError::WriteFailed { .. })
        ));
    }
}
