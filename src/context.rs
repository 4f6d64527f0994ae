//! Execution context shared by every pipeline stage.

use std::path::PathBuf;

use crate::dist;
use crate::platform::{Compiler, Platform};

/// Configuration for a provisioning run. Built once at startup, never
/// mutated while the pipeline runs.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory the distributions are downloaded to and extracted in.
    pub build_dir: PathBuf,
    /// Directory holding the platform configuration templates.
    pub files_dir: PathBuf,
    /// Directory the final package layout is assembled in.
    pub package_dir: PathBuf,
    /// Detected (or overridden) host platform.
    pub platform: Platform,
    /// Compiler family of the native toolchain.
    pub compiler: Compiler,
    /// Build shared libraries instead of static (Linux only).
    pub shared: bool,
    /// Number of parallel jobs for the native builds.
    pub nproc: usize,
    /// If true, print commands as they execute.
    pub verbose: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            build_dir: std::env::temp_dir().join("epics-provision"),
            files_dir: PathBuf::from("files"),
            package_dir: PathBuf::from("package"),
            platform: Platform::detect().unwrap_or(Platform::Linux),
            compiler: Compiler::Gcc,
            shared: false,
            nproc: num_cpus::get(),
            verbose: false,
        }
    }
}

impl Context {
    /// Set the build directory.
    pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = dir.into();
        self
    }

    /// Set the template directory.
    pub fn files_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.files_dir = dir.into();
        self
    }

    /// Set the package output directory.
    pub fn package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_dir = dir.into();
        self
    }

    /// Override the detected platform.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the compiler family.
    pub fn compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Request shared libraries. Ignored on non-Linux platforms.
    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    /// Set verbose mode.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Root of the extracted EPICS Base source tree.
    pub fn base_root(&self) -> PathBuf {
        self.build_dir.join(dist::BASE.dir_name)
    }

    /// Root of the extracted EPICS V4 source tree.
    pub fn v4_root(&self) -> PathBuf {
        self.build_dir.join(dist::V4.dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = Context::default()
            .build_dir("/tmp/b")
            .platform(Platform::Macos)
            .shared(true)
            .verbose(true);

        assert_eq!(ctx.build_dir, PathBuf::from("/tmp/b"));
        assert_eq!(ctx.platform, Platform::Macos);
        assert!(ctx.shared);
        assert!(ctx.verbose);
    }

    #[test]
    fn test_distribution_roots_under_build_dir() {
        let ctx = Context::default().build_dir("/work");
        assert_eq!(ctx.base_root(), PathBuf::from("/work/base-3.16.1"));
        assert_eq!(ctx.v4_root(), PathBuf::from("/work/EPICS-CPP-4.6.0"));
    }
}
