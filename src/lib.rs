//! One-shot provisioning pipeline for EPICS Base and the EPICS V4 C++ bundle.
//!
//! Downloads two pinned source tarballs, verifies their sha256 hashes,
//! extracts them, applies per-platform configuration patches, runs each
//! tree's native build in dependency order, and collects the results into a
//! redistributable `bin/ include/ lib/` layout.
//!
//! # Pipeline
//!
//! ```text
//! fetch base ─ fetch v4 ─ configure base ─ build base ─┐
//!                                                      ▼
//!                          configure v4 ─ build v4 (EPICS_BASE=<base>)
//!                                                      ▼
//!                                              collect artifacts
//! ```
//!
//! The V4 build depends on the completed base build; the base install path
//! is handed over as a typed [`BuildOutput`] and injected only into the
//! child build's environment. Every error is fatal; there is no retry and
//! no partial-success mode.

pub mod build;
pub mod config;
pub mod context;
pub mod dist;
pub mod error;
pub mod fetch;
pub mod output;
pub mod package;
pub mod platform;
mod provisioner;

pub use build::BuildOutput;
pub use context::Context;
pub use error::ProvisionError;
pub use platform::{Compiler, Platform};
pub use provisioner::Provisioner;
