//! Platform-specific configuration of the extracted source trees.
//!
//! Each platform has a fixed template bundle (shipped in `files/`) and a
//! fixed patch set. Applying the same platform config twice over a tree
//! yields byte-identical results: wholesale copies restore the pristine
//! template and the patch routine tolerates already-applied edits.

mod patch;

pub use patch::{apply, Patch};

use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::error::ProvisionError;
use crate::output;
use crate::platform::{Compiler, Platform};

/// Directive block substituted for the `<static_or_shared>` placeholder.
fn link_mode_block(shared: bool) -> &'static str {
    if shared {
        "STATIC_BUILD = NO\nSHARED_LIBRARIES = YES"
    } else {
        "STATIC_BUILD = YES\nSHARED_LIBRARIES = NO"
    }
}

/// Resolve a template file from the bundle directory.
fn template(ctx: &Context, name: &str) -> Result<PathBuf, ProvisionError> {
    let path = ctx.files_dir.join(name);
    if !path.is_file() {
        return Err(ProvisionError::MissingTemplate(path));
    }
    Ok(path)
}

fn install_template(ctx: &Context, name: &str, dest: &Path) -> Result<(), ProvisionError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(template(ctx, name)?, dest)?;
    Ok(())
}

/// Configure the EPICS Base tree for the current platform.
pub fn configure_base(ctx: &Context) -> Result<(), ProvisionError> {
    output::sub_action(&format!("configure base ({})", ctx.platform.name()));
    match ctx.platform {
        Platform::Linux => configure_base_linux(ctx),
        Platform::Macos => configure_base_macos(ctx),
        Platform::Windows => configure_base_windows(ctx),
    }
}

fn configure_base_linux(ctx: &Context) -> Result<(), ProvisionError> {
    let root = ctx.base_root();

    install_template(
        ctx,
        "CONFIG_SITE.local.linux",
        &root.join("configure/CONFIG_SITE.local"),
    )?;

    let mut patches = vec![
        Patch::new(
            "configure/CONFIG_SITE.local",
            "<static_or_shared>",
            link_mode_block(ctx.shared),
        ),
        // The readline-backed line editor drags in a system dependency the
        // package must not require at runtime.
        Patch::new(
            "configure/os/CONFIG_SITE.Common.linux-x86_64",
            "COMMANDLINE_LIBRARY = READLINE",
            "COMMANDLINE_LIBRARY = EPICS",
        ),
    ];

    if ctx.compiler == Compiler::Gcc {
        let gcc = locate_tool("gcc")?;
        let gxx = locate_tool("g++")?;
        patches.extend(compiler_path_patches(&gcc, &gxx));
    }

    apply(&root, &patches)
}

/// Find a toolchain binary on PATH.
fn locate_tool(name: &str) -> Result<PathBuf, ProvisionError> {
    which::which(name).map_err(|e| ProvisionError::Config {
        file: PathBuf::from("configure/CONFIG.gnuCommon"),
        reason: format!("cannot locate '{}' on PATH: {}", name, e),
    })
}

/// Patches pointing the gnu toolchain variables at the host's actual
/// compiler binaries. The stock configuration hardcodes
/// `$(GNU_BIN)/...` locations that do not match relocated toolchains
/// (devtoolset and friends), and the C++ sources need the c++11 standard
/// spelled out for older gcc defaults.
pub fn compiler_path_patches(gcc: &Path, gxx: &Path) -> Vec<Patch> {
    vec![
        Patch::new(
            "configure/CONFIG.gnuCommon",
            "CC = $(GNU_BIN)/$(CMPLR_PREFIX)gcc$(CMPLR_SUFFIX)",
            format!("CC = {}", gcc.display()),
        ),
        Patch::new(
            "configure/CONFIG.gnuCommon",
            "CCC = $(GNU_BIN)/$(CMPLR_PREFIX)g++$(CMPLR_SUFFIX)",
            format!("CCC = {}", gxx.display()),
        ),
        Patch::new(
            "configure/CONFIG.gnuCommon",
            "OPT_CXXFLAGS_YES = -O3",
            "OPT_CXXFLAGS_YES = -O3 -std=c++11",
        ),
    ]
}

fn configure_base_macos(ctx: &Context) -> Result<(), ProvisionError> {
    let root = ctx.base_root();

    install_template(
        ctx,
        "CONFIG_SITE.local.darwin",
        &root.join("configure/CONFIG_SITE.local"),
    )?;

    // The stock darwin OS config is unconditionally incompatible with the
    // expected host layout; swap the whole file rather than patching it.
    let os_config = root.join("configure/os/CONFIG_SITE.darwinCommon.darwinCommon");
    if os_config.exists() {
        std::fs::remove_file(&os_config)?;
    }
    install_template(ctx, "CONFIG_SITE.darwinCommon.darwinCommon", &os_config)
}

fn configure_base_windows(ctx: &Context) -> Result<(), ProvisionError> {
    let root = ctx.base_root();

    install_template(
        ctx,
        "CONFIG_SITE.local.win32",
        &root.join("configure/CONFIG_SITE.local"),
    )?;

    // Environment setup sits next to the source trees so both batch drivers
    // can call it.
    install_template(ctx, "win32.bat", &ctx.build_dir.join("win32.bat"))?;
    install_template(ctx, "build_win32.bat", &root.join("build_win32.bat"))
}

/// Configure the EPICS V4 tree for the current platform.
///
/// On windows the top-level Makefile is swapped wholesale for one without
/// the example module (the examples fail to build there); elsewhere the
/// module line is commented out in place.
pub fn configure_extension(ctx: &Context) -> Result<(), ProvisionError> {
    output::sub_action(&format!("configure v4 ({})", ctx.platform.name()));
    let root = ctx.v4_root();

    match ctx.platform {
        Platform::Windows => {
            install_template(ctx, "build_v4.bat", &root.join("build_v4.bat"))?;
            install_template(ctx, "Makefile", &root.join("Makefile"))
        }
        Platform::Linux | Platform::Macos => apply(
            &root,
            &[Patch::new(
                "Makefile",
                "MODULES += exampleCPP",
                "#MODULES += exampleCPP",
            )],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dist;

    /// Build a fake extracted pair of trees plus a template bundle.
    fn fake_env() -> (tempfile::TempDir, Context) {
        let temp = tempfile::tempdir().unwrap();
        let build_dir = temp.path().join("build");
        let files_dir = temp.path().join("files");
        std::fs::create_dir_all(&files_dir).unwrap();

        let ctx = Context::default()
            .build_dir(&build_dir)
            .files_dir(&files_dir)
            .platform(Platform::Linux)
            .compiler(Compiler::Clang);

        let base_cfg = ctx.base_root().join("configure");
        std::fs::create_dir_all(base_cfg.join("os")).unwrap();
        std::fs::write(
            base_cfg.join("os/CONFIG_SITE.Common.linux-x86_64"),
            "COMMANDLINE_LIBRARY = READLINE\n",
        )
        .unwrap();
        std::fs::write(
            base_cfg.join("os/CONFIG_SITE.darwinCommon.darwinCommon"),
            "stock darwin config\n",
        )
        .unwrap();
        std::fs::write(
            base_cfg.join("CONFIG.gnuCommon"),
            "CC = $(GNU_BIN)/$(CMPLR_PREFIX)gcc$(CMPLR_SUFFIX)\n\
             CCC = $(GNU_BIN)/$(CMPLR_PREFIX)g++$(CMPLR_SUFFIX)\n\
             OPT_CXXFLAGS_YES = -O3\n",
        )
        .unwrap();

        std::fs::create_dir_all(ctx.v4_root()).unwrap();
        std::fs::write(
            ctx.v4_root().join("Makefile"),
            "MODULES += pvDataCPP\nMODULES += exampleCPP\n",
        )
        .unwrap();

        for name in [
            "CONFIG_SITE.local.linux",
            "CONFIG_SITE.local.darwin",
            "CONFIG_SITE.local.win32",
        ] {
            std::fs::write(files_dir.join(name), "<static_or_shared>\n").unwrap();
        }
        std::fs::write(
            files_dir.join("CONFIG_SITE.darwinCommon.darwinCommon"),
            "replacement darwin config\n",
        )
        .unwrap();
        for name in ["win32.bat", "build_win32.bat", "build_v4.bat", "Makefile"] {
            std::fs::write(files_dir.join(name), format!("rem {}\n", name)).unwrap();
        }

        (temp, ctx)
    }

    #[test]
    fn test_linux_shared_selects_shared_block() {
        let (_temp, ctx) = fake_env();
        let ctx = ctx.shared(true);
        configure_base(&ctx).unwrap();

        let site =
            std::fs::read_to_string(ctx.base_root().join("configure/CONFIG_SITE.local")).unwrap();
        assert!(site.contains("SHARED_LIBRARIES = YES"));
        assert!(!site.contains("STATIC_BUILD = YES"));
        assert!(!site.contains("<static_or_shared>"));
    }

    #[test]
    fn test_linux_static_is_default() {
        let (_temp, ctx) = fake_env();
        configure_base(&ctx).unwrap();

        let site =
            std::fs::read_to_string(ctx.base_root().join("configure/CONFIG_SITE.local")).unwrap();
        assert!(site.contains("STATIC_BUILD = YES"));
        assert!(!site.contains("SHARED_LIBRARIES = YES"));
    }

    #[test]
    fn test_linux_swaps_commandline_library() {
        let (_temp, ctx) = fake_env();
        configure_base(&ctx).unwrap();

        let os_cfg = std::fs::read_to_string(
            ctx.base_root()
                .join("configure/os/CONFIG_SITE.Common.linux-x86_64"),
        )
        .unwrap();
        assert!(os_cfg.contains("COMMANDLINE_LIBRARY = EPICS"));
        assert!(!os_cfg.contains("READLINE"));
    }

    #[test]
    fn test_configure_base_is_idempotent() {
        let (_temp, ctx) = fake_env();
        configure_base(&ctx).unwrap();
        let first =
            std::fs::read_to_string(ctx.base_root().join("configure/CONFIG_SITE.local")).unwrap();

        configure_base(&ctx).unwrap();
        let second =
            std::fs::read_to_string(ctx.base_root().join("configure/CONFIG_SITE.local")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compiler_path_patches_substitute_real_paths() {
        let (_temp, ctx) = fake_env();
        let root = ctx.base_root();

        let patches =
            compiler_path_patches(Path::new("/opt/rh/bin/gcc"), Path::new("/opt/rh/bin/g++"));
        apply(&root, &patches).unwrap();

        let gnu = std::fs::read_to_string(root.join("configure/CONFIG.gnuCommon")).unwrap();
        assert!(gnu.contains("CC = /opt/rh/bin/gcc"));
        assert!(gnu.contains("CCC = /opt/rh/bin/g++"));
        assert!(gnu.contains("OPT_CXXFLAGS_YES = -O3 -std=c++11"));

        // Re-applying must not stack the language-standard flag.
        apply(&root, &patches).unwrap();
        let gnu = std::fs::read_to_string(root.join("configure/CONFIG.gnuCommon")).unwrap();
        assert_eq!(gnu.matches("-std=c++11").count(), 1);
    }

    #[test]
    fn test_macos_swaps_os_config_wholesale() {
        let (_temp, ctx) = fake_env();
        let ctx = ctx.platform(Platform::Macos);
        configure_base(&ctx).unwrap();

        let os_cfg = std::fs::read_to_string(
            ctx.base_root()
                .join("configure/os/CONFIG_SITE.darwinCommon.darwinCommon"),
        )
        .unwrap();
        assert_eq!(os_cfg, "replacement darwin config\n");

        // macOS must not touch the linux-only patch target.
        let linux_cfg = std::fs::read_to_string(
            ctx.base_root()
                .join("configure/os/CONFIG_SITE.Common.linux-x86_64"),
        )
        .unwrap();
        assert!(linux_cfg.contains("READLINE"));
    }

    #[test]
    fn test_windows_installs_batch_drivers() {
        let (_temp, ctx) = fake_env();
        let ctx = ctx.platform(Platform::Windows);
        configure_base(&ctx).unwrap();
        configure_extension(&ctx).unwrap();

        assert!(ctx.build_dir.join("win32.bat").exists());
        assert!(ctx.base_root().join("build_win32.bat").exists());
        assert!(ctx.v4_root().join("build_v4.bat").exists());
        // V4 Makefile is swapped wholesale on windows.
        let makefile = std::fs::read_to_string(ctx.v4_root().join("Makefile")).unwrap();
        assert_eq!(makefile, "rem Makefile\n");
    }

    #[test]
    fn test_extension_comments_out_examples() {
        let (_temp, ctx) = fake_env();
        configure_extension(&ctx).unwrap();

        let makefile = std::fs::read_to_string(ctx.v4_root().join("Makefile")).unwrap();
        assert!(makefile.contains("#MODULES += exampleCPP"));
        assert!(makefile.contains("MODULES += pvDataCPP"));

        // Second run over the patched tree is a no-op.
        configure_extension(&ctx).unwrap();
        let again = std::fs::read_to_string(ctx.v4_root().join("Makefile")).unwrap();
        assert_eq!(makefile, again);
    }

    #[test]
    fn test_missing_template_is_reported() {
        let (_temp, ctx) = fake_env();
        std::fs::remove_file(ctx.files_dir.join("CONFIG_SITE.local.linux")).unwrap();

        let err = configure_base(&ctx).unwrap_err();
        assert!(matches!(err, ProvisionError::MissingTemplate(_)));
    }

    #[test]
    fn test_v4_dir_name_matches_metadata() {
        let (_temp, ctx) = fake_env();
        assert!(ctx.v4_root().ends_with(dist::V4.dir_name));
    }
}
