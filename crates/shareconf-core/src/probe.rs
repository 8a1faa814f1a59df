//! Probe definitions and per-probe results.

use crate::release::Channel;
use serde::{Deserialize, Serialize};

/// A single black-box invocation of the installed binary plus its expected
/// exit code and output contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Probe {
    /// Probe name, used in reports.
    pub name: String,

    /// Arguments passed to the installed binary.
    pub args: Vec<String>,

    /// Exit code the process must terminate with.
    pub expected_exit_code: i32,

    /// Substring that must appear in the merged stdout/stderr. Containment,
    /// never equality: the output may contain unrelated text.
    pub expected_output: String,

    /// When set, the probe only applies to descriptors on this channel.
    /// Elsewhere it is skipped, neither passed nor failed.
    pub gate: Option<Channel>,
}

impl Probe {
    /// Create an ungated probe.
    pub fn new(name: &str, args: &[&str], expected_exit_code: i32, expected_output: &str) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            expected_exit_code,
            expected_output: expected_output.to_string(),
            gate: None,
        }
    }

    /// Restrict this probe to one channel.
    pub fn gated(mut self, channel: Channel) -> Self {
        self.gate = Some(channel);
        self
    }

    /// Whether this probe applies to the given channel.
    pub fn applies_to(&self, channel: Channel) -> bool {
        self.gate.map_or(true, |gate| gate == channel)
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Passed,
    Failed,
    /// Gated off for the active channel. Not executed, not counted against
    /// suite success.
    Skipped,
}

/// Recorded result of one probe invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Probe name.
    pub probe_name: String,

    /// Pass/fail/skip verdict.
    pub status: ProbeStatus,

    /// Observed exit code. `None` for skipped probes.
    pub exit_code: Option<i32>,

    /// Merged stdout/stderr as captured. Empty for skipped probes.
    pub output: String,

    /// Exit code the contract expected.
    pub expected_exit_code: i32,

    /// Substring the contract expected.
    pub expected_output: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl ProbeResult {
    /// Whether this probe passed.
    pub fn passed(&self) -> bool {
        self.status == ProbeStatus::Passed
    }

    /// Whether this probe was skipped by its channel gate.
    pub fn skipped(&self) -> bool {
        self.status == ProbeStatus::Skipped
    }

    /// A skipped-probe record for a gated-off probe.
    pub fn skipped_for(probe: &Probe) -> Self {
        Self {
            probe_name: probe.name.clone(),
            status: ProbeStatus::Skipped,
            exit_code: None,
            output: String::new(),
            expected_exit_code: probe.expected_exit_code,
            expected_output: probe.expected_output.clone(),
            duration_ms: 0,
        }
    }
}
