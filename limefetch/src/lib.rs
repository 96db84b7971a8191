//! limefetch - LiME kernel-module repository client
//!
//! Resolves and downloads versioned kernel modules from a YUM-style package
//! repository, verifying a SHA-256 checksum at every transport boundary
//! before any payload is trusted. The walk is two-stage: the repository
//! index names a manifest per category, the manifest catalogues modules by
//! kernel version, and the resolved module is downloaded and verified
//! before its local path is returned.

pub mod checksum;
pub mod decode;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod repository;
pub mod transport;

pub use error::{RepositoryError, RepositoryResult};
pub use metadata::{ManifestDescriptor, ManifestTable, ModuleRecord, RepositoryIndex};
pub use repository::{AdvisoryVerifier, ModuleFetcher, Repository, SignatureVerifier};
pub use transport::{HttpClient, ReqwestClient};
