//! Host platform detection.
//!
//! The platform is determined once per run and drives which configuration
//! templates are applied and how the native builds are invoked.

use clap::ValueEnum;

/// Operating system category for the host being provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Linux,
    Macos,
    Windows,
}

impl Platform {
    /// Detect the platform from the running process.
    pub fn detect() -> Option<Self> {
        match std::env::consts::OS {
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Macos),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    /// The EPICS host architecture directory name for this platform.
    pub fn arch_dir(&self) -> &'static str {
        match self {
            Self::Linux => "linux-x86_64",
            Self::Macos => "darwin-x86",
            Self::Windows => "windows-x64",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
        }
    }
}

/// Compiler family used by the native builds.
///
/// Only the gcc family triggers compiler-path substitution on Linux; the
/// default EPICS configuration hardcodes toolchain locations that may not
/// match where the host actually keeps its gcc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Compiler {
    Gcc,
    Clang,
    Msvc,
}
