//! shareconf-core - Release conformance for crab_share
//!
//! Defines, per release of the `crab_share` upload tool, how its source is
//! identified and what observable contract the installed binary must honor:
//! - Release descriptors (pinned stable tarballs, floating head branches)
//! - Black-box probe suites asserting exit codes and output substrings
//! - A sequential suite runner reporting pass/fail/skip per probe

pub mod builder;
pub mod catalog;
pub mod error;
pub mod probe;
pub mod release;
pub mod runner;
pub mod suite;
pub mod telemetry;

// Re-export key types
pub use builder::{verify_source_artifact, ReleaseBuilder};
pub use catalog::{ReleaseCatalog, ReleaseEntry, Shell};
pub use error::{HarnessError, Result};
pub use probe::{Probe, ProbeResult, ProbeStatus};
pub use release::{Channel, ReleaseDescriptor, SOURCE_REPOSITORY, TOOL_NAME};
pub use runner::{SuiteResult, SuiteRunner};
pub use suite::ConformanceSuite;
pub use telemetry::init_tracing;
