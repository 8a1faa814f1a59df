//! Boundary with the external build/install host.
//!
//! Fetching, sandboxed compilation and dependency resolution belong to the
//! host. The harness only pins the seam: stable sources must pass
//! [`verify_source_artifact`] before any build proceeds, and a completed
//! build hands back one installed executable path.

use crate::error::{HarnessError, Result};
use crate::release::ReleaseDescriptor;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::info;

/// Verify a fetched stable source artifact against its declared digest.
///
/// A mismatch is fatal: the build never proceeds. Head descriptors carry no
/// digest and are accepted unverified.
pub fn verify_source_artifact(descriptor: &ReleaseDescriptor, artifact: &[u8]) -> Result<()> {
    let Some(expected) = descriptor.sha256() else {
        info!(locator = %descriptor.source_locator(), "head artifact accepted unverified");
        return Ok(());
    };

    let actual = hex::encode(Sha256::digest(artifact));
    if actual != expected {
        return Err(HarnessError::DigestMismatch {
            version: descriptor.version().unwrap_or("unknown").to_string(),
            expected: expected.to_string(),
            actual,
        });
    }

    info!(locator = %descriptor.source_locator(), digest = %actual, "source artifact verified");
    Ok(())
}

/// External builder producing an installed binary from a resolved source.
#[async_trait]
pub trait ReleaseBuilder: Send + Sync {
    /// Fetch, verify (for stable) and build the descriptor's source,
    /// returning the path of the installed executable.
    async fn build(&self, descriptor: &ReleaseDescriptor) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fake builder that "installs" a fixed path after digest verification.
    struct FakeBuilder {
        artifact: Vec<u8>,
        installed: PathBuf,
    }

    #[async_trait]
    impl ReleaseBuilder for FakeBuilder {
        async fn build(&self, descriptor: &ReleaseDescriptor) -> Result<PathBuf> {
            verify_source_artifact(descriptor, &self.artifact)?;
            Ok(self.installed.clone())
        }
    }

    fn digest_of(bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    #[test]
    fn test_matching_digest_accepted() {
        let artifact = b"release tarball bytes";
        let desc = ReleaseDescriptor::stable("0.3.0", &digest_of(artifact)).unwrap();
        assert!(verify_source_artifact(&desc, artifact).is_ok());
    }

    #[test]
    fn test_mismatched_digest_is_fatal() {
        let desc = ReleaseDescriptor::stable("0.3.0", &digest_of(b"expected bytes")).unwrap();
        let err = verify_source_artifact(&desc, b"tampered bytes").unwrap_err();
        match err {
            HarnessError::DigestMismatch {
                version,
                expected,
                actual,
            } => {
                assert_eq!(version, "0.3.0");
                assert_ne!(expected, actual);
            }
            other => panic!("expected DigestMismatch, got {other}"),
        }
    }

    #[test]
    fn test_head_artifact_accepted_unverified() {
        let desc = ReleaseDescriptor::head("main").unwrap();
        assert!(verify_source_artifact(&desc, b"whatever the branch tip holds").is_ok());
    }

    #[tokio::test]
    async fn test_fake_builder_verifies_before_install() {
        let artifact = b"source".to_vec();
        let builder = FakeBuilder {
            installed: PathBuf::from("/usr/local/bin/crab_share"),
            artifact: artifact.clone(),
        };

        let good = ReleaseDescriptor::stable("0.3.0", &digest_of(&artifact)).unwrap();
        let path = builder.build(&good).await.unwrap();
        assert_eq!(path, PathBuf::from("/usr/local/bin/crab_share"));

        let bad = ReleaseDescriptor::stable("0.3.0", &digest_of(b"other")).unwrap();
        assert!(matches!(
            builder.build(&bad).await.unwrap_err(),
            HarnessError::DigestMismatch { .. }
        ));
    }
}
