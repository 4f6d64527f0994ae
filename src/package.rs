//! Artifact collection into the redistributable package layout.
//!
//! Pure file-copy glue: gathers the allow-listed binaries, all headers, and
//! the platform's libraries from both build trees into `bin/ include/ lib/`.

use std::path::Path;

use walkdir::WalkDir;

use crate::context::Context;
use crate::dist;
use crate::error::ProvisionError;
use crate::output;

/// Move each distribution's LICENSE up to the build directory under a
/// distinguishing name. Runs right after the base build; already-stashed
/// licenses are left alone so the step can be re-run.
pub fn stash_licenses(ctx: &Context) -> Result<(), ProvisionError> {
    stash_license(&ctx.base_root(), &ctx.build_dir.join("LICENSE.EPICSBase"))?;
    stash_license(&ctx.v4_root(), &ctx.build_dir.join("LICENSE.EPICSV4"))
}

fn stash_license(root: &Path, dest: &Path) -> Result<(), ProvisionError> {
    let src = root.join("LICENSE");
    if !src.exists() && dest.exists() {
        return Ok(());
    }
    std::fs::rename(&src, dest)?;
    Ok(())
}

/// Collect binaries, headers, and libraries from both build trees into the
/// package directory.
pub fn collect(ctx: &Context) -> Result<(), ProvisionError> {
    let arch = ctx.platform.arch_dir();
    let out = &ctx.package_dir;
    for sub in ["bin", "include", "lib"] {
        std::fs::create_dir_all(out.join(sub))?;
    }

    // EPICS Base
    let base = ctx.base_root();
    let base_bin = base.join("bin").join(arch);
    for bin in dist::BASE.bins {
        copy_file_if_exists(&base_bin.join(bin), &out.join("bin").join(bin))?;
    }
    copy_matching(&base_bin, "*.dll", &out.join("bin"))?;
    // Headers are flattened; the valgrind support headers are internal
    // diagnostics and must not ship.
    copy_tree_flat(&base.join("include"), &out.join("include"), "valgrind")?;
    copy_tree(&base.join("lib").join(arch), &out.join("lib"))?;
    copy_tree(&base.join("lib/pkgconfig"), &out.join("lib/pkgconfig"))?;

    // EPICS V4 modules
    for module in dist::V4_SUBDIRS {
        let root = ctx.v4_root().join(module);
        copy_tree(&root.join("include"), &out.join("include"))?;
        copy_tree(&root.join("lib").join(arch), &out.join("lib"))?;
        copy_matching(&root.join("bin").join(arch), "*.dll", &out.join("bin"))?;
    }
    let v4_bin = ctx.v4_root().join("pvAccessCPP/bin").join(arch);
    for bin in dist::V4.bins {
        copy_file_if_exists(&v4_bin.join(bin), &out.join("bin").join(bin))?;
    }

    copy_matching(&ctx.build_dir, "LICENSE.*", out)?;

    output::detail(&format!("package assembled in {}", out.display()));
    Ok(())
}

/// Print the fixed, ordered library list consumers should link against.
pub fn print_package_info() {
    for lib in dist::PACKAGE_LIBS {
        println!("{}", lib);
    }
}

fn copy_file_if_exists(src: &Path, dest: &Path) -> Result<(), ProvisionError> {
    if src.is_file() {
        std::fs::copy(src, dest)?;
    }
    Ok(())
}

/// Copy a directory tree preserving its structure. Missing sources are a
/// no-op: not every platform produces every tree (dlls, pkgconfig).
fn copy_tree(src: &Path, dest: &Path) -> Result<(), ProvisionError> {
    if !src.is_dir() {
        return Ok(());
    }

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            std::io::Error::other(format!("walk error under {}: {}", src.display(), e))
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Copy all files under `src` into `dest` with paths flattened, skipping
/// anything under the `exclude` subdirectory.
fn copy_tree_flat(src: &Path, dest: &Path, exclude: &str) -> Result<(), ProvisionError> {
    if !src.is_dir() {
        return Ok(());
    }

    for entry in WalkDir::new(src)
        .into_iter()
        .filter_entry(|e| e.file_name() != exclude)
    {
        let entry = entry.map_err(|e| {
            std::io::Error::other(format!("walk error under {}: {}", src.display(), e))
        })?;
        if entry.file_type().is_file() {
            let name = entry.file_name();
            std::fs::copy(entry.path(), dest.join(name))?;
        }
    }

    Ok(())
}

/// Copy files whose names match a glob pattern from `dir` into `dest`.
///
/// Matches against file names only, so path separators never reach the
/// pattern engine (backslashes in full paths are glob escapes on windows).
fn copy_matching(dir: &Path, pattern: &str, dest: &Path) -> Result<(), ProvisionError> {
    if !dir.is_dir() {
        return Ok(());
    }

    let matcher = glob::Pattern::new(pattern)
        .map_err(|e| std::io::Error::other(format!("bad glob '{}': {}", pattern, e)))?;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if entry.file_type()?.is_file() && matcher.matches(&name.to_string_lossy()) {
            std::fs::copy(entry.path(), dest.join(&name))?;
        }
    }

    Ok(())
}
