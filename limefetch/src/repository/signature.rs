//! Signature verification extension point.
//!
//! The repository publishes detached signatures alongside its metadata and
//! modules. Cryptographic verification of those signatures is not
//! implemented; the default verifier accepts everything and says so loudly.
//! Checksum verification is always performed regardless of what a verifier
//! decides.

use tracing::warn;

use crate::error::RepositoryResult;

/// Verifies a payload against a detached signature.
pub trait SignatureVerifier: Send + Sync {
    /// Verify `signature` over `payload`.
    fn verify(&self, payload: &[u8], signature: &[u8]) -> RepositoryResult<()>;
}

/// Advisory verifier that performs no cryptographic check.
///
/// Accepts every signature and logs a warning that the content was not
/// verified. This is a placeholder until a real verifier exists; it offers
/// no protection.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdvisoryVerifier;

impl SignatureVerifier for AdvisoryVerifier {
    fn verify(&self, _payload: &[u8], signature: &[u8]) -> RepositoryResult<()> {
        warn!(
            signature_len = signature.len(),
            "signature fetched but not cryptographically verified"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_verifier_accepts_anything() {
        let verifier = AdvisoryVerifier;
        assert!(verifier.verify(b"payload", b"signature").is_ok());
        assert!(verifier.verify(b"", b"").is_ok());
    }
}
