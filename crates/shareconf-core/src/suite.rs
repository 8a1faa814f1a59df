//! Conformance suites: ordered, channel-aware probe sets.

use crate::probe::Probe;
use crate::release::{Channel, ReleaseDescriptor, TOOL_NAME};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Fixture file the upload probes reference, created in the scratch
/// directory before the suite runs.
pub const FIXTURE_FILE: &str = "test.txt";

/// Contents of the fixture file.
pub const FIXTURE_CONTENT: &str = "Hello World!";

/// Path the missing-file probe passes; must never exist in the scratch dir.
pub const MISSING_FILE: &str = "file-does-not-exist.txt";

/// Expected diagnostic when no credentials are configured. The tool reads
/// `~/.aws/credentials.json` and surfaces the raw OS error; the exact Unix
/// phrasing is part of the frozen contract.
pub const NO_CREDENTIALS_ERROR: &str =
    "error reading credentials file: No such file or directory (os error 2)";

/// Expected diagnostic when the positional path is not a real file.
pub const MISSING_PATH_ERROR: &str = "path does not exist";

/// An ordered sequence of probes defining a release's observable contract.
///
/// Probes are independent: execution order is fixed, but no probe's outcome
/// affects whether subsequent probes run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConformanceSuite {
    probes: Vec<Probe>,
}

impl ConformanceSuite {
    /// Build a suite from an ordered probe list.
    pub fn new(probes: Vec<Probe>) -> Self {
        Self { probes }
    }

    /// The canonical probe set for a release.
    ///
    /// The version probe is gated to stable: head builds have no fixed
    /// version string to assert against. The help and upload probes test
    /// invariant CLI behavior and run on every channel.
    pub fn canonical(descriptor: &ReleaseDescriptor) -> Self {
        let mut probes = vec![Self::version_probe(descriptor)];
        probes.push(Probe::new("help", &["--help"], 0, "Usage:"));
        probes.push(Probe::new(
            "upload_no_credentials",
            &[FIXTURE_FILE],
            1,
            NO_CREDENTIALS_ERROR,
        ));
        probes.push(Probe::new(
            "upload_missing_path",
            &[MISSING_FILE],
            1,
            MISSING_PATH_ERROR,
        ));
        Self::new(probes)
    }

    /// The pre-0.2.0 suite: a lone version probe, mirroring the earliest
    /// release definition before the CLI contract was pinned down.
    pub fn version_only(descriptor: &ReleaseDescriptor) -> Self {
        Self::new(vec![Self::version_probe(descriptor)])
    }

    fn version_probe(descriptor: &ReleaseDescriptor) -> Probe {
        // The expected substring is derived from the descriptor, so the
        // declared version and the contract assertion cannot drift apart.
        let expected = match descriptor.version() {
            Some(version) => format!("{} {}", TOOL_NAME, version),
            None => TOOL_NAME.to_string(),
        };
        Probe::new("version", &["--version"], 0, &expected).gated(Channel::Stable)
    }

    /// Probes in execution order.
    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Number of probes, including ones a channel gate may skip.
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Whether the suite has no probes.
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Deterministic identity digest over ordered probe names.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for probe in &self.probes {
            hasher.update(probe.name.as_bytes());
            hasher.update(b"\0");
        }
        hex::encode(hasher.finalize())
    }
}
