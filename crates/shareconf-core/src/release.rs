//! Release descriptors and channel resolution.
//!
//! A [`ReleaseDescriptor`] is an immutable record identifying one source
//! artifact to build: a pinned, digest-verified tarball for [`Channel::Stable`]
//! or a floating branch tip for [`Channel::Head`]. The two shapes are a tagged
//! enum, so a descriptor can never be partially specified.

use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};

/// Upstream repository for head checkouts.
pub const SOURCE_REPOSITORY: &str = "https://github.com/lounge-rocks/crab_share";

/// Name of the tool under test, as printed by its `--version` output.
pub const TOOL_NAME: &str = "crab_share";

/// Release track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Pinned immutable version, digest-verified before building.
    Stable,

    /// Latest commit of a named branch, unreproducible by design.
    Head,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Stable => write!(f, "stable"),
            Channel::Head => write!(f, "head"),
        }
    }
}

/// Immutable metadata identifying one source artifact to build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum ReleaseDescriptor {
    Stable {
        /// Semantic version of the pinned release.
        version: String,

        /// Versioned source tarball URL.
        source_url: String,

        /// SHA-256 hex digest of the source tarball. Verified by the builder
        /// before any build proceeds.
        sha256: String,
    },
    Head {
        /// Repository to check out.
        repository: String,

        /// Branch whose tip is built. No digest: there is no fixed artifact
        /// to hash.
        branch: String,
    },
}

impl ReleaseDescriptor {
    /// Construct a stable descriptor for a pinned version.
    ///
    /// The digest must be 64 lowercase hex characters (SHA-256).
    pub fn stable(version: &str, sha256: &str) -> Result<Self> {
        if version.is_empty() {
            return Err(HarnessError::InvalidDescriptor(
                "version is empty".to_string(),
            ));
        }
        if sha256.len() != 64 || !sha256.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HarnessError::InvalidDescriptor(format!(
                "sha256 is not 64 hex chars: {}",
                sha256
            )));
        }
        Ok(ReleaseDescriptor::Stable {
            version: version.to_string(),
            source_url: format!(
                "{}/archive/refs/tags/{}.tar.gz",
                SOURCE_REPOSITORY, version
            ),
            sha256: sha256.to_lowercase(),
        })
    }

    /// Construct a head descriptor tracking a branch tip.
    pub fn head(branch: &str) -> Result<Self> {
        if branch.is_empty() {
            return Err(HarnessError::InvalidDescriptor(
                "branch is empty".to_string(),
            ));
        }
        Ok(ReleaseDescriptor::Head {
            repository: SOURCE_REPOSITORY.to_string(),
            branch: branch.to_string(),
        })
    }

    /// The descriptor's channel.
    pub fn channel(&self) -> Channel {
        match self {
            ReleaseDescriptor::Stable { .. } => Channel::Stable,
            ReleaseDescriptor::Head { .. } => Channel::Head,
        }
    }

    /// Pinned version, present only for stable descriptors.
    pub fn version(&self) -> Option<&str> {
        match self {
            ReleaseDescriptor::Stable { version, .. } => Some(version),
            ReleaseDescriptor::Head { .. } => None,
        }
    }

    /// Declared source digest, present only for stable descriptors.
    pub fn sha256(&self) -> Option<&str> {
        match self {
            ReleaseDescriptor::Stable { sha256, .. } => Some(sha256),
            ReleaseDescriptor::Head { .. } => None,
        }
    }

    /// URL or repository+branch reference used to fetch the source.
    pub fn source_locator(&self) -> String {
        match self {
            ReleaseDescriptor::Stable { source_url, .. } => source_url.clone(),
            ReleaseDescriptor::Head { repository, branch } => {
                format!("{}#{}", repository, branch)
            }
        }
    }
}

impl std::fmt::Display for ReleaseDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseDescriptor::Stable { version, .. } => {
                write!(f, "{} {} (stable)", TOOL_NAME, version)
            }
            ReleaseDescriptor::Head { branch, .. } => {
                write!(f, "{} {} (head)", TOOL_NAME, branch)
            }
        }
    }
}
