//! Native build invocation for the extracted distributions.
//!
//! The V4 bundle locates EPICS Base through the `EPICS_BASE` variable. That
//! hand-off is modelled as a typed [`BuildOutput`] returned by the base
//! build and consumed by the extension build; the variable is injected into
//! the child process environment only, never into this process.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::context::Context;
use crate::error::ProvisionError;
use crate::output;
use crate::platform::Platform;

/// Result of a completed base build, carrying the install location the
/// extension build depends on.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub install_path: PathBuf,
}

/// Build EPICS Base in its extracted source root.
pub fn build_base(ctx: &Context) -> Result<BuildOutput, ProvisionError> {
    let root = ctx.base_root();
    let (program, args) = base_build_command(ctx.platform, ctx.nproc);
    run(ctx, &root, &program, &args, None)?;
    Ok(BuildOutput { install_path: root })
}

/// Build the EPICS V4 bundle against a completed base build.
///
/// Fails fast if the base install path is not on disk; the extension build
/// cannot start before the base build has completed.
pub fn build_extension(ctx: &Context, base: &BuildOutput) -> Result<(), ProvisionError> {
    if !base.install_path.is_dir() {
        return Err(ProvisionError::BaseNotBuilt(base.install_path.clone()));
    }

    let root = ctx.v4_root();
    let (program, args) = extension_build_command(ctx.platform, ctx.nproc, &base.install_path);
    run(
        ctx,
        &root,
        &program,
        &args,
        Some(("EPICS_BASE", base.install_path.as_path())),
    )
}

/// Command line for the base build: the tree's own `make` entry point, or
/// the installed batch driver on windows.
pub fn base_build_command(platform: Platform, nproc: usize) -> (String, Vec<String>) {
    match platform {
        Platform::Windows => (
            "cmd".to_string(),
            vec!["/C".to_string(), "build_win32.bat".to_string()],
        ),
        Platform::Linux | Platform::Macos => ("make".to_string(), vec![format!("-j{}", nproc)]),
    }
}

/// Command line for the extension build. The windows batch driver takes the
/// base install path as its argument.
pub fn extension_build_command(
    platform: Platform,
    nproc: usize,
    epics_base: &Path,
) -> (String, Vec<String>) {
    match platform {
        Platform::Windows => (
            "cmd".to_string(),
            vec![
                "/C".to_string(),
                "build_v4.bat".to_string(),
                epics_base.display().to_string(),
            ],
        ),
        Platform::Linux | Platform::Macos => ("make".to_string(), vec![format!("-j{}", nproc)]),
    }
}

/// Run a build command in `dir`, inheriting stdio so the native tool's own
/// diagnostics surface directly. Nonzero exit is fatal; no retry.
fn run(
    ctx: &Context,
    dir: &Path,
    program: &str,
    args: &[String],
    extra_env: Option<(&str, &Path)>,
) -> Result<(), ProvisionError> {
    let cmdline = format!("{} {}", program, args.join(" "));
    if ctx.verbose {
        output::detail(&format!("[{}] {}", dir.display(), cmdline));
    }

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(dir);
    if let Some((key, value)) = extra_env {
        cmd.env(key, value);
    }

    let status = cmd.status()?;
    if !status.success() {
        return Err(ProvisionError::Build {
            cmd: cmdline,
            code: status.code(),
        });
    }

    Ok(())
}
