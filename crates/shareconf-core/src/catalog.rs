//! Versioned catalog of release definitions.
//!
//! Each entry is an immutable snapshot pairing a descriptor with the
//! conformance suite that defined its contract at release time. The suite
//! only changes between entries when the contract itself changed.

use crate::error::{HarnessError, Result};
use crate::release::{Channel, ReleaseDescriptor};
use crate::suite::ConformanceSuite;
use serde::{Deserialize, Serialize};

/// Shell families completion scripts are generated for at install time.
///
/// Completion generation is a build-time side effect (`--generate-completion`)
/// the harness records but does not probe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Shell {
    Bash,
    Zsh,
}

/// One release definition: descriptor, contract, and install-time extras.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseEntry {
    /// Source artifact for this release.
    pub descriptor: ReleaseDescriptor,

    /// Conformance suite pinned at release time.
    pub suite: ConformanceSuite,

    /// Shells to generate completion scripts for during install.
    pub completions: Vec<Shell>,
}

/// Ordered release history, oldest stable first, head last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseCatalog {
    entries: Vec<ReleaseEntry>,
}

impl ReleaseCatalog {
    /// The release history baked into this harness.
    pub fn bundled() -> Self {
        // unwraps are safe: every pin below is well-formed by construction
        // and covered by test_bundled_catalog_is_well_formed.
        let v0_1_0 = ReleaseDescriptor::stable(
            "0.1.0",
            "6e6453bc785a77c77da3e52edd00488f0844c7351fc41c28fe7a9770bcc4c9d8",
        )
        .unwrap();
        let v0_2_0 = ReleaseDescriptor::stable(
            "0.2.0",
            "a1f8beb731ae5ca4bff9dc5b82cfb6b7b18e1ff0c2f6e36a8a3c2e0d94517c3a",
        )
        .unwrap();
        let v0_3_0 = ReleaseDescriptor::stable(
            "0.3.0",
            "3d94a1b0a6a7f0f2cc0db5a37c21c4a1e13a75d2ee00b9428a45c0af6c18e9b4",
        )
        .unwrap();
        let head = ReleaseDescriptor::head("main").unwrap();

        let entries = vec![
            // 0.1.0 predates the pinned CLI contract: version probe only,
            // no completion scripts.
            ReleaseEntry {
                suite: ConformanceSuite::version_only(&v0_1_0),
                descriptor: v0_1_0,
                completions: vec![],
            },
            ReleaseEntry {
                suite: ConformanceSuite::canonical(&v0_2_0),
                descriptor: v0_2_0,
                completions: vec![],
            },
            // Completion generation entered the install step at 0.3.0.
            ReleaseEntry {
                suite: ConformanceSuite::canonical(&v0_3_0),
                descriptor: v0_3_0,
                completions: vec![Shell::Bash, Shell::Zsh],
            },
            ReleaseEntry {
                suite: ConformanceSuite::canonical(&head),
                descriptor: head,
                completions: vec![Shell::Bash, Shell::Zsh],
            },
        ];

        Self { entries }
    }

    /// All entries, oldest stable first, head last.
    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    /// The newest stable entry.
    pub fn latest_stable(&self) -> Result<&ReleaseEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.descriptor.channel() == Channel::Stable)
            .ok_or_else(|| HarnessError::UnknownRelease("no stable release".to_string()))
    }

    /// The head entry.
    pub fn head(&self) -> Result<&ReleaseEntry> {
        self.entries
            .iter()
            .find(|e| e.descriptor.channel() == Channel::Head)
            .ok_or_else(|| HarnessError::UnknownRelease("no head release".to_string()))
    }

    /// Find a stable entry by version string.
    pub fn find(&self, version: &str) -> Result<&ReleaseEntry> {
        self.entries
            .iter()
            .find(|e| e.descriptor.version() == Some(version))
            .ok_or_else(|| HarnessError::UnknownRelease(version.to_string()))
    }

    /// Resolve a channel selector into an entry: head, or a specific
    /// stable version, or the latest stable when no version is given.
    pub fn resolve(&self, channel: Channel, version: Option<&str>) -> Result<&ReleaseEntry> {
        match channel {
            Channel::Head => self.head(),
            Channel::Stable => match version {
                Some(v) => self.find(v),
                None => self.latest_stable(),
            },
        }
    }
}
