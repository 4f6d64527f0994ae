//! Provisioning error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while provisioning the distributions.
///
/// Every variant is fatal: the pipeline is one-shot and is expected to be
/// re-run from scratch after the root cause is fixed.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("download failed for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("sha256 mismatch for '{path}'\n  expected: {expected}\n  got:      {actual}")]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("extraction failed for '{archive}': {reason}")]
    Extraction { archive: PathBuf, reason: String },

    #[error("config patch failed for '{file}': {reason}")]
    Config { file: PathBuf, reason: String },

    #[error("template file not found: {0}")]
    MissingTemplate(PathBuf),

    #[error("build command failed: {cmd} (exit code: {code:?})")]
    Build { cmd: String, code: Option<i32> },

    #[error("EPICS base install path does not exist: {0} (build the base distribution first)")]
    BaseNotBuilt(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
