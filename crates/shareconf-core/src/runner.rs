//! Conformance suite execution against one installed binary.

use crate::error::{HarnessError, Result};
use crate::probe::{Probe, ProbeResult, ProbeStatus};
use crate::release::Channel;
use crate::suite::ConformanceSuite;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::info;

/// Result of a complete suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    /// Unique id for this run.
    pub run_id: String,

    /// Identity digest of the executed suite.
    pub suite_digest: String,

    /// Channel the suite ran under.
    pub channel: Channel,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Conjunction of all non-skipped probe results.
    pub success: bool,

    /// Per-probe results in suite order, skipped probes included.
    pub probes: Vec<ProbeResult>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl SuiteResult {
    /// Number of probes that passed.
    pub fn passed_count(&self) -> usize {
        self.probes.iter().filter(|p| p.passed()).count()
    }

    /// Number of probes that failed.
    pub fn failed_count(&self) -> usize {
        self.probes
            .iter()
            .filter(|p| p.status == ProbeStatus::Failed)
            .count()
    }

    /// Number of probes skipped by their channel gate.
    pub fn skipped_count(&self) -> usize {
        self.probes.iter().filter(|p| p.skipped()).count()
    }
}

/// Executes a [`ConformanceSuite`] against one installed binary.
///
/// Execution is strictly sequential: one probe's invocation completes before
/// the next begins. There is no timeout layer; each probe is expected to be a
/// short-lived local CLI call that fails fast before any network I/O.
pub struct SuiteRunner {
    binary: PathBuf,
    working_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    env_remove: Vec<String>,
}

impl SuiteRunner {
    /// Create a runner for the given installed binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: None,
            env: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    /// Working directory for probe invocations (the scratch directory
    /// holding test fixtures).
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Override an environment variable in the probed process.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Remove an environment variable from the probed process.
    pub fn without_env(mut self, key: &str) -> Self {
        self.env_remove.push(key.to_string());
        self
    }

    /// Run every probe in suite order and report per-probe results.
    ///
    /// Contract failures are recorded and the suite continues. A binary that
    /// cannot be launched at all is an infrastructure error: it aborts the
    /// remaining suite instead of being recorded as a probe failure.
    pub async fn run(&self, channel: Channel, suite: &ConformanceSuite) -> Result<SuiteResult> {
        if !self.binary.exists() {
            return Err(HarnessError::MissingBinary(self.binary.clone()));
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start = Instant::now();

        info!(run_id = %run_id, binary = %self.binary.display(), channel = %channel, "starting conformance suite");

        let mut results = Vec::with_capacity(suite.len());
        let mut all_passed = true;

        for probe in suite.probes() {
            if !probe.applies_to(channel) {
                info!(probe = %probe.name, channel = %channel, "probe gated off, skipping");
                results.push(ProbeResult::skipped_for(probe));
                continue;
            }

            let result = self.execute_probe(probe).await?;
            if !result.passed() {
                all_passed = false;
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            success = all_passed,
            duration_ms = duration_ms,
            "conformance suite finished"
        );

        Ok(SuiteResult {
            run_id,
            suite_digest: suite.digest(),
            channel,
            started_at,
            success: all_passed,
            probes: results,
            duration_ms,
        })
    }

    /// Invoke the binary once for a single probe.
    async fn execute_probe(&self, probe: &Probe) -> Result<ProbeResult> {
        let start = Instant::now();

        let mut command = Command::new(&self.binary);
        command
            .args(&probe.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        for key in &self.env_remove {
            command.env_remove(key);
        }
        for (key, value) in &self.env {
            command.env(key, value);
        }

        let output = command.output().await.map_err(|source| HarnessError::Launch {
            binary: self.binary.clone(),
            source,
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);

        // Merge the streams; the contract is a containment check over the
        // combined output.
        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let exit_ok = exit_code == probe.expected_exit_code;
        let output_ok = combined.contains(&probe.expected_output);
        let status = if exit_ok && output_ok {
            ProbeStatus::Passed
        } else {
            ProbeStatus::Failed
        };

        info!(
            probe = %probe.name,
            exit_code = exit_code,
            passed = (status == ProbeStatus::Passed),
            duration_ms = duration_ms,
            "probe executed"
        );

        Ok(ProbeResult {
            probe_name: probe.name.clone(),
            status,
            exit_code: Some(exit_code),
            output: combined,
            expected_exit_code: probe.expected_exit_code,
            expected_output: probe.expected_output.clone(),
            duration_ms,
        })
    }
}
