//! End-to-end suite runs against a fake crab_share binary.
//!
//! The fake is a shell script reproducing the tool's observable contract:
//! version/help output, the missing-path diagnostic, and the
//! credentials-file precondition failure (checked before any upload).

use shareconf_core::suite::{FIXTURE_CONTENT, FIXTURE_FILE};
use shareconf_core::{
    Channel, ConformanceSuite, HarnessError, ProbeStatus, ReleaseDescriptor, SuiteRunner,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const STABLE_DIGEST: &str = "3d94a1b0a6a7f0f2cc0db5a37c21c4a1e13a75d2ee00b9428a45c0af6c18e9b4";

const FAKE_CRAB_SHARE: &str = r#"#!/bin/sh
case "$1" in
  --version)
    echo "crab_share 0.3.0"
    exit 0
    ;;
  --help)
    echo "Usage: crab_share [OPTIONS] <PATH>"
    exit 0
    ;;
  *)
    if [ ! -e "$1" ]; then
      echo "path does not exist"
      exit 1
    fi
    if [ ! -f "$HOME/.aws/credentials.json" ]; then
      echo "error reading credentials file: No such file or directory (os error 2)"
      exit 1
    fi
    echo "https://s3.example/share/$1"
    exit 0
    ;;
esac
"#;

/// Write the fake binary and the fixture file into a scratch directory.
fn install_fake_binary(dir: &Path) -> PathBuf {
    let binary = dir.join("crab_share");
    std::fs::write(&binary, FAKE_CRAB_SHARE).unwrap();
    let mut perms = std::fs::metadata(&binary).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&binary, perms).unwrap();

    std::fs::write(dir.join(FIXTURE_FILE), FIXTURE_CONTENT).unwrap();
    binary
}

/// Runner configured the way the CLI configures it: scratch working dir,
/// HOME pointed at the scratch dir, S3 credentials scrubbed.
fn runner_for(binary: &Path, scratch: &Path) -> SuiteRunner {
    SuiteRunner::new(binary)
        .with_working_dir(scratch)
        .with_env("HOME", scratch.to_str().unwrap())
        .without_env("S3_URL")
        .without_env("S3_ACCESS_KEY")
        .without_env("S3_SECRET_KEY")
}

#[tokio::test]
async fn test_stable_release_passes_full_suite() {
    let scratch = tempfile::tempdir().unwrap();
    let binary = install_fake_binary(scratch.path());

    let descriptor = ReleaseDescriptor::stable("0.3.0", STABLE_DIGEST).unwrap();
    let suite = ConformanceSuite::canonical(&descriptor);
    let result = runner_for(&binary, scratch.path())
        .run(Channel::Stable, &suite)
        .await
        .expect("suite run failed");

    assert!(result.success, "all probes should pass: {:?}", result.probes);
    assert_eq!(result.passed_count(), 4);
    assert_eq!(result.skipped_count(), 0);

    // Scenario 1: the version probe observed the pinned version string.
    let version = &result.probes[0];
    assert_eq!(version.exit_code, Some(0));
    assert!(version.output.contains("crab_share 0.3.0"));
}

#[tokio::test]
async fn test_upload_without_credentials_fails_with_os_error() {
    let scratch = tempfile::tempdir().unwrap();
    let binary = install_fake_binary(scratch.path());

    let descriptor = ReleaseDescriptor::stable("0.3.0", STABLE_DIGEST).unwrap();
    let suite = ConformanceSuite::canonical(&descriptor);
    let result = runner_for(&binary, scratch.path())
        .run(Channel::Stable, &suite)
        .await
        .unwrap();

    let creds = result
        .probes
        .iter()
        .find(|p| p.probe_name == "upload_no_credentials")
        .unwrap();
    assert_eq!(creds.exit_code, Some(1));
    assert!(creds
        .output
        .contains("error reading credentials file: No such file or directory (os error 2)"));
}

#[tokio::test]
async fn test_upload_of_missing_path_reports_bad_input() {
    let scratch = tempfile::tempdir().unwrap();
    let binary = install_fake_binary(scratch.path());

    let descriptor = ReleaseDescriptor::stable("0.3.0", STABLE_DIGEST).unwrap();
    let suite = ConformanceSuite::canonical(&descriptor);
    let result = runner_for(&binary, scratch.path())
        .run(Channel::Stable, &suite)
        .await
        .unwrap();

    let missing = result
        .probes
        .iter()
        .find(|p| p.probe_name == "upload_missing_path")
        .unwrap();
    assert_eq!(missing.exit_code, Some(1));
    assert!(missing.output.contains("path does not exist"));
    // Misconfigured environment and bad input share the exit code but
    // must surface different text.
    assert!(!missing.output.contains("credentials"));
}

#[tokio::test]
async fn test_head_run_skips_version_probe_only() {
    let scratch = tempfile::tempdir().unwrap();
    let binary = install_fake_binary(scratch.path());

    let descriptor = ReleaseDescriptor::head("main").unwrap();
    let suite = ConformanceSuite::canonical(&descriptor);
    let result = runner_for(&binary, scratch.path())
        .run(Channel::Head, &suite)
        .await
        .unwrap();

    // Scenario 4: version skipped, everything else executed normally.
    assert_eq!(result.probes[0].status, ProbeStatus::Skipped);
    assert_eq!(result.skipped_count(), 1);
    assert_eq!(result.passed_count(), 3);
    assert!(result.success, "skipped probes must not affect success");
}

#[tokio::test]
async fn test_suite_run_is_idempotent() {
    let scratch = tempfile::tempdir().unwrap();
    let binary = install_fake_binary(scratch.path());

    let descriptor = ReleaseDescriptor::stable("0.3.0", STABLE_DIGEST).unwrap();
    let suite = ConformanceSuite::canonical(&descriptor);
    let runner = runner_for(&binary, scratch.path());

    let first = runner.run(Channel::Stable, &suite).await.unwrap();
    let second = runner.run(Channel::Stable, &suite).await.unwrap();

    let verdicts =
        |r: &shareconf_core::SuiteResult| r.probes.iter().map(|p| p.status).collect::<Vec<_>>();
    assert_eq!(verdicts(&first), verdicts(&second));
    assert_eq!(first.success, second.success);
    assert_eq!(first.suite_digest, second.suite_digest);
}

#[tokio::test]
async fn test_version_drift_fails_the_probe() {
    let scratch = tempfile::tempdir().unwrap();
    let binary = install_fake_binary(scratch.path());

    // A formula bump without a matching binary bump: the descriptor claims
    // 0.4.0 but the installed binary still prints 0.3.0.
    let descriptor = ReleaseDescriptor::stable("0.4.0", STABLE_DIGEST).unwrap();
    let suite = ConformanceSuite::canonical(&descriptor);
    let result = runner_for(&binary, scratch.path())
        .run(Channel::Stable, &suite)
        .await
        .unwrap();

    assert!(!result.success);
    let version = &result.probes[0];
    assert_eq!(version.status, ProbeStatus::Failed);
    assert_eq!(version.exit_code, Some(0));
    // The remaining probes still ran and passed.
    assert_eq!(result.passed_count(), 3);
}

#[tokio::test]
async fn test_unexecutable_binary_aborts_suite() {
    let scratch = tempfile::tempdir().unwrap();
    // Present but not executable.
    let binary = scratch.path().join("crab_share");
    std::fs::write(&binary, "not a program").unwrap();

    let descriptor = ReleaseDescriptor::head("main").unwrap();
    let suite = ConformanceSuite::canonical(&descriptor);
    let err = runner_for(&binary, scratch.path())
        .run(Channel::Head, &suite)
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::Launch { .. }));
}
