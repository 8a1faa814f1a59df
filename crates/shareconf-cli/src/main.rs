//! shareconf - release conformance for crab_share
//!
//! ## Commands
//!
//! - `catalog`: list the bundled release history
//! - `resolve`: resolve a channel selector into a release descriptor
//! - `verify-source`: digest-check a fetched source artifact
//! - `run`: execute a release's conformance suite against an installed binary

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use shareconf_core::suite::{FIXTURE_CONTENT, FIXTURE_FILE};
use shareconf_core::{
    verify_source_artifact, Channel, ProbeStatus, ReleaseCatalog, ReleaseEntry, SuiteResult,
    SuiteRunner,
};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "shareconf")]
#[command(author = "lounge.rocks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Release conformance harness for crab_share", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Channel selector as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelArg {
    Stable,
    Head,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Stable => Channel::Stable,
            ChannelArg::Head => Channel::Head,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the bundled release history
    Catalog {
        /// Emit JSON output instead of terminal text
        #[arg(long)]
        json: bool,
    },

    /// Resolve a channel selector into a release descriptor
    Resolve {
        /// Release channel
        #[arg(short, long, value_enum, default_value = "stable")]
        channel: ChannelArg,

        /// Stable version to resolve (default: latest stable)
        #[arg(long)]
        version: Option<String>,

        /// Emit JSON output instead of terminal text
        #[arg(long)]
        json: bool,
    },

    /// Verify a fetched source artifact against its catalog pin
    VerifySource {
        /// Stable version the artifact claims to be
        #[arg(long)]
        version: String,

        /// Path to the fetched source tarball
        #[arg(long)]
        artifact: PathBuf,
    },

    /// Run a release's conformance suite against an installed binary
    Run {
        /// Path to the installed crab_share binary
        #[arg(short, long)]
        binary: PathBuf,

        /// Release channel
        #[arg(short, long, value_enum, default_value = "stable")]
        channel: ChannelArg,

        /// Stable version whose contract to check (default: latest stable)
        #[arg(long)]
        version: Option<String>,

        /// Emit the suite result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    shareconf_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Catalog { json } => cmd_catalog(json),
        Commands::Resolve {
            channel,
            version,
            json,
        } => cmd_resolve(channel.into(), version.as_deref(), json),
        Commands::VerifySource { version, artifact } => cmd_verify_source(&version, &artifact),
        Commands::Run {
            binary,
            channel,
            version,
            json,
        } => cmd_run(&binary, channel.into(), version.as_deref(), json).await,
    }
}

/// List the bundled release history
fn cmd_catalog(json: bool) -> Result<()> {
    let catalog = ReleaseCatalog::bundled();

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.entries())?);
        return Ok(());
    }

    for entry in catalog.entries() {
        let completions = if entry.completions.is_empty() {
            "none".to_string()
        } else {
            entry
                .completions
                .iter()
                .map(|s| format!("{:?}", s).to_lowercase())
                .collect::<Vec<_>>()
                .join(",")
        };
        println!(
            "{:24} probes: {}  completions: {}",
            entry.descriptor.to_string(),
            entry.suite.len(),
            completions
        );
    }

    Ok(())
}

/// Resolve a channel selector into a release descriptor
fn cmd_resolve(channel: Channel, version: Option<&str>, json: bool) -> Result<()> {
    let catalog = ReleaseCatalog::bundled();
    let entry = catalog
        .resolve(channel, version)
        .context("failed to resolve release")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry.descriptor)?);
        return Ok(());
    }

    println!("{}", entry.descriptor);
    println!("Source: {}", entry.descriptor.source_locator());
    if let Some(sha256) = entry.descriptor.sha256() {
        println!("SHA256: {}", sha256);
    }

    Ok(())
}

/// Verify a fetched source artifact against its catalog pin
fn cmd_verify_source(version: &str, artifact: &PathBuf) -> Result<()> {
    let catalog = ReleaseCatalog::bundled();
    let entry = catalog
        .find(version)
        .with_context(|| format!("no catalog entry for version {}", version))?;

    let bytes = std::fs::read(artifact)
        .with_context(|| format!("failed to read artifact: {:?}", artifact))?;

    verify_source_artifact(&entry.descriptor, &bytes)?;

    println!(
        "✓ {} matches declared digest {}",
        artifact.display(),
        entry.descriptor.sha256().unwrap_or("(none)")
    );
    Ok(())
}

/// Run a release's conformance suite against an installed binary
async fn cmd_run(
    binary: &PathBuf,
    channel: Channel,
    version: Option<&str>,
    json: bool,
) -> Result<()> {
    let catalog = ReleaseCatalog::bundled();
    let entry = catalog
        .resolve(channel, version)
        .context("failed to resolve release")?;

    // Scratch directory: fixture file for the upload probes, and a HOME
    // with no credentials so the precondition probe fails before any
    // network I/O.
    let scratch = tempfile::tempdir().context("failed to create scratch directory")?;
    std::fs::write(scratch.path().join(FIXTURE_FILE), FIXTURE_CONTENT)
        .context("failed to write fixture file")?;

    info!(binary = %binary.display(), release = %entry.descriptor, "running conformance suite");

    let scratch_home = scratch
        .path()
        .to_str()
        .context("scratch path is not valid UTF-8")?;
    let runner = SuiteRunner::new(binary)
        .with_working_dir(scratch.path())
        .with_env("HOME", scratch_home)
        .without_env("S3_URL")
        .without_env("S3_ACCESS_KEY")
        .without_env("S3_SECRET_KEY");

    let result = runner
        .run(channel, &entry.suite)
        .await
        .context("conformance suite could not be executed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(entry, &result);
    }

    if result.success {
        Ok(())
    } else {
        anyhow::bail!("conformance suite failed")
    }
}

fn print_result(entry: &ReleaseEntry, result: &SuiteResult) {
    println!("Release: {}", entry.descriptor);
    println!("Run ID:  {}", result.run_id);
    println!(
        "Status:  {}",
        if result.success { "✓ PASSED" } else { "✗ FAILED" }
    );
    println!();

    for probe in &result.probes {
        match probe.status {
            ProbeStatus::Passed => println!(
                "  ✓ {} ({}ms, exit code: {})",
                probe.probe_name,
                probe.duration_ms,
                probe.exit_code.unwrap_or(-1)
            ),
            ProbeStatus::Skipped => println!("  - {} (skipped)", probe.probe_name),
            ProbeStatus::Failed => {
                println!(
                    "  ✗ {} (exit code: {:?}, expected {})",
                    probe.probe_name, probe.exit_code, probe.expected_exit_code
                );
                println!("      expected output to contain: {}", probe.expected_output);
                println!("      captured output: {}", probe.output.trim_end());
            }
        }
    }

    println!();
    println!(
        "Summary: {}/{} probes passed, {} skipped",
        result.passed_count(),
        result.probes.len() - result.skipped_count(),
        result.skipped_count()
    );
}
