//! The sequential provisioning pipeline.

use crate::build::{self, BuildOutput};
use crate::config;
use crate::context::Context;
use crate::dist;
use crate::error::ProvisionError;
use crate::fetch;
use crate::output;
use crate::package;

/// Drives the whole pipeline: fetch both distributions, configure and build
/// them in dependency order, collect the artifacts.
///
/// Strictly sequential; each stage's output on disk is the next stage's
/// precondition. A failure leaves the build directory as-is for inspection,
/// and the run is expected to be restarted from scratch after the cause is
/// fixed.
pub struct Provisioner {
    ctx: Context,
}

impl Provisioner {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    /// Fetch, verify, and extract both source distributions.
    pub fn source(&self) -> Result<(), ProvisionError> {
        output::action("Fetching sources");
        fetch::fetch(&dist::BASE, &self.ctx)?;
        fetch::fetch(&dist::V4, &self.ctx)?;
        Ok(())
    }

    /// Configure and build both distributions.
    ///
    /// The extension build cannot start before the base build has completed;
    /// the base install path flows into it through [`BuildOutput`].
    pub fn build(&self) -> Result<BuildOutput, ProvisionError> {
        output::action(&format!("Building {}-{}", dist::BASE.name, dist::BASE.version));
        config::configure_base(&self.ctx)?;
        let base = build::build_base(&self.ctx)?;
        package::stash_licenses(&self.ctx)?;

        output::action(&format!("Building {}-{}", dist::V4.name, dist::V4.version));
        config::configure_extension(&self.ctx)?;
        build::build_extension(&self.ctx, &base)?;

        Ok(base)
    }

    /// Assemble the package layout from the build trees.
    pub fn package(&self) -> Result<(), ProvisionError> {
        output::action("Collecting artifacts");
        package::collect(&self.ctx)
    }

    /// Run the complete pipeline.
    pub fn run(&self) -> Result<(), ProvisionError> {
        self.source()?;
        self.build()?;
        self.package()?;
        output::success("provisioning complete");
        Ok(())
    }
}
