//! Repository client: metadata resolution and module retrieval.
//!
//! Resolution is strictly linear: repository index, then the manifest the
//! index names, then the module the manifest names. Every payload beyond
//! the index is checksum-verified before it is parsed or returned, with the
//! compressed manifest verified before decompression and the decompressed
//! document verified before parsing.

mod module;
mod signature;

use std::path::PathBuf;

use tracing::debug;

use crate::checksum::verify_checksum;
use crate::decode::gunzip;
use crate::error::{RepositoryError, RepositoryResult};
use crate::metadata::{
    parse_index, parse_manifest, ManifestDescriptor, ManifestTable, RepositoryIndex,
};
use crate::transport::{HttpClient, ReqwestClient};

pub use module::ModuleFetcher;
pub use signature::{AdvisoryVerifier, SignatureVerifier};

/// Subdirectory holding repository metadata.
const METADATA_DIR: &str = "repodata";

/// Repository index filename.
const METADATA_FILE: &str = "repomd.xml";

/// Client for a LiME kernel-module package repository.
///
/// Holds no state across calls; each [`fetch`](Repository::fetch) performs
/// the full index → manifest → module walk.
pub struct Repository<C: HttpClient> {
    base_url: String,
    client: C,
    gpg_verify: bool,
    verifier: Box<dyn SignatureVerifier>,
    fetcher: ModuleFetcher,
}

impl Repository<ReqwestClient> {
    /// Create a repository client backed by a real HTTP client.
    ///
    /// # Arguments
    ///
    /// * `url` - Repository base URL; a trailing slash is stripped
    /// * `gpg_verify` - Fetch the metadata signature and hand it to the
    ///   configured [`SignatureVerifier`]
    pub fn new(url: &str, gpg_verify: bool) -> RepositoryResult<Self> {
        Ok(Self::with_client(ReqwestClient::new()?, url, gpg_verify))
    }
}

impl<C: HttpClient> Repository<C> {
    /// Create a repository client with an injected HTTP client.
    pub fn with_client(client: C, url: &str, gpg_verify: bool) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
            client,
            gpg_verify,
            verifier: Box::new(AdvisoryVerifier),
            fetcher: ModuleFetcher::new(),
        }
    }

    /// Replace the signature verifier.
    pub fn with_signature_verifier(mut self, verifier: Box<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Set the directory downloaded modules are written into.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.fetcher = ModuleFetcher::with_output_dir(output_dir);
        self
    }

    /// Repository base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve and download the kernel module for `kernel_version`.
    ///
    /// Walks the repository metadata, verifies every payload against its
    /// declared checksum, and returns the path of the downloaded module.
    ///
    /// # Arguments
    ///
    /// * `kernel_version` - Kernel version to search the repository for
    /// * `manifest_type` - Manifest category to search, e.g. `kernel`
    ///
    /// # Errors
    ///
    /// Surfaces every failure from the chain: transport, checksum, decode,
    /// parse, or a missing manifest type / kernel version. Nothing is
    /// retried and no partial result is returned.
    pub fn fetch(&self, kernel_version: &str, manifest_type: &str) -> RepositoryResult<PathBuf> {
        let index = self.fetch_index()?;
        debug!(
            revision = %index.revision,
            manifests = index.manifests.len(),
            "parsed repository index"
        );

        let descriptor = index.manifests.get(manifest_type).ok_or_else(|| {
            RepositoryError::ManifestTypeNotFound {
                manifest_type: manifest_type.to_string(),
            }
        })?;

        let manifest = self.fetch_manifest(descriptor)?;

        let record =
            manifest
                .get(kernel_version)
                .ok_or_else(|| RepositoryError::ModuleNotFound {
                    kernel_version: kernel_version.to_string(),
                    url: self.base_url.clone(),
                })?;
        debug!(name = %record.name, version = %record.version, "resolved kernel module");

        self.fetcher.fetch(&self.client, &self.base_url, record)
    }

    /// Fetch and parse the repository index.
    ///
    /// The index is the trust root: no checksum applies to it. When
    /// `gpg_verify` is set its detached signature is fetched and passed to
    /// the configured verifier.
    fn fetch_index(&self) -> RepositoryResult<RepositoryIndex> {
        let index_url = format!("{}/{}/{}", self.base_url, METADATA_DIR, METADATA_FILE);
        let body = self.client.get(&index_url)?;

        if self.gpg_verify {
            let signature_url = format!("{}.sig", index_url);
            let signature = self.client.get(&signature_url)?;
            self.verifier.verify(&body, &signature)?;
        }

        parse_index(&body)
    }

    /// Fetch, verify, decompress, and parse the manifest a descriptor names.
    ///
    /// The compressed payload is verified before it reaches the decoder,
    /// and the decompressed document is verified before it is parsed.
    fn fetch_manifest(&self, descriptor: &ManifestDescriptor) -> RepositoryResult<ManifestTable> {
        let url = format!("{}/{}", self.base_url, descriptor.location);
        let compressed = self.client.get(&url)?;

        verify_checksum(&compressed, &descriptor.checksum, &descriptor.location)?;

        let document = gunzip(&compressed, &descriptor.location)?;

        let open_label = descriptor
            .location
            .strip_suffix(".gz")
            .unwrap_or(&descriptor.location);
        verify_checksum(&document, &descriptor.open_checksum, open_label)?;

        parse_manifest(&document)
    }
}
