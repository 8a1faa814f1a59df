//! Error taxonomy for the conformance harness.
//!
//! Fatal conditions (integrity, build, infrastructure) are `Err` values that
//! abort the current operation. Contract failures are not errors at all —
//! they are recorded per probe and reported via `SuiteResult`.

use std::path::PathBuf;

/// Harness errors.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("source digest mismatch for {version}: expected {expected}, got {actual}")]
    DigestMismatch {
        version: String,
        expected: String,
        actual: String,
    },

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("installed binary not found: {0:?}")]
    MissingBinary(PathBuf),

    #[error("failed to launch {binary:?}: {source}")]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown release: {0}")]
    UnknownRelease(String),

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_mismatch_display() {
        let err = HarnessError::DigestMismatch {
            version: "0.3.0".to_string(),
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.3.0"));
        assert!(msg.contains("abc123"));
        assert!(msg.contains("def456"));
    }

    #[test]
    fn test_missing_binary_display() {
        let err = HarnessError::MissingBinary(PathBuf::from("/opt/crab_share"));
        assert!(err.to_string().contains("/opt/crab_share"));
    }

    #[test]
    fn test_unknown_release_display() {
        let err = HarnessError::UnknownRelease("9.9.9".to_string());
        assert!(err.to_string().contains("unknown release"));
        assert!(err.to_string().contains("9.9.9"));
    }
}
