//! Repository metadata types and parsing.
//!
//! A repository publishes two levels of metadata: a top-level index
//! (`repomd.xml`) listing the available manifests by type, and per-type
//! manifests cataloguing the kernel modules themselves. Both are XML and
//! both are decoded field-by-field into the typed structures below; any
//! missing or malformed field surfaces as
//! [`RepositoryError::MetadataParse`](crate::error::RepositoryError).

mod index;
mod manifest;
mod xml;

use std::collections::HashMap;

use chrono::{DateTime, Utc};

pub use index::parse_index;
pub use manifest::parse_manifest;

/// Parsed repository index (`repomd.xml`).
///
/// Discarded after a single fetch; nothing is cached across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIndex {
    /// Repository revision string.
    pub revision: String,

    /// Available manifests keyed by manifest type.
    pub manifests: HashMap<String, ManifestDescriptor>,
}

/// One manifest advertised by the repository index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDescriptor {
    /// Manifest type, e.g. `kernel`.
    pub manifest_type: String,

    /// SHA-256 of the compressed manifest payload at `location`.
    pub checksum: String,

    /// SHA-256 of the decompressed manifest document.
    pub open_checksum: String,

    /// Repository-relative path of the compressed manifest.
    pub location: String,

    /// When the manifest was published.
    pub timestamp: DateTime<Utc>,

    /// Size of the compressed payload in bytes.
    pub size: u64,

    /// Size of the decompressed document in bytes.
    pub open_size: u64,
}

/// Kernel-module catalog resolved from one manifest, keyed by version.
///
/// A duplicate version in the source document overwrites the earlier entry.
pub type ManifestTable = HashMap<String, ModuleRecord>;

/// One kernel module entry in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Module type attribute, e.g. `lime`.
    pub module_type: String,

    /// Module name.
    pub name: String,

    /// Target architecture.
    pub arch: String,

    /// SHA-256 of the raw module bytes at `location`.
    pub checksum: String,

    /// Kernel version the module was built for.
    pub version: String,

    /// Who packaged the module.
    pub packager: String,

    /// Repository-relative path of the module file.
    pub location: String,

    /// Repository-relative path of the detached signature.
    pub signature: String,

    /// Target platform.
    pub platform: String,
}
