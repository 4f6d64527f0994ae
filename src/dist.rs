//! Pinned distribution metadata.
//!
//! Exactly two distributions are provisioned: EPICS Base and the EPICS V4
//! C++ bundle. Everything here is fixed at compile time; the pipeline never
//! computes versions, URLs, or hashes at runtime.

/// A pinned third-party source distribution.
#[derive(Debug, Clone, Copy)]
pub struct Distribution {
    pub name: &'static str,
    pub version: &'static str,
    /// Directory the tarball extracts to.
    pub dir_name: &'static str,
    pub url: &'static str,
    /// Expected sha256 of the tarball.
    pub sha256: &'static str,
    /// Binaries collected into the package.
    pub bins: &'static [&'static str],
}

impl Distribution {
    /// Local filename the tarball is downloaded to.
    pub fn archive_name(&self) -> String {
        format!("{}.tar.gz", self.dir_name)
    }
}

/// EPICS Base, the foundation the V4 bundle builds against.
pub const BASE: Distribution = Distribution {
    name: "epics-base",
    version: "3.16.1",
    dir_name: "base-3.16.1",
    url: "https://epics.anl.gov/download/base/base-3.16.1.tar.gz",
    sha256: "fc01ff8505871b9fa7693a4d5585667587105f34ec5e16a207d07b704d1dc5ed",
    bins: &["caRepeater", "caget", "cainfo", "camonitor", "caput"],
};

/// EPICS V4 C++ bundle. Its build locates Base via the EPICS_BASE variable.
pub const V4: Distribution = Distribution {
    name: "epics-v4",
    version: "4.6.0",
    dir_name: "EPICS-CPP-4.6.0",
    url: "https://sourceforge.net/projects/epics-pvdata/files/4.6.0/EPICS-CPP-4.6.0.tar.gz/download",
    sha256: "fc369a1663b197cce23b47762bf3e1aadc49677e01be5063885160de79df6d9c",
    bins: &["eget", "pvget", "pvinfo", "pvlist", "pvput", "testServer"],
};

/// Module subdirectories of the V4 bundle that contribute headers and libs.
pub const V4_SUBDIRS: &[&str] = &[
    "normativeTypesCPP",
    "pvAccessCPP",
    "pvCommonCPP",
    "pvDataCPP",
    "pvDatabaseCPP",
    "pvaClientCPP",
    "pvaSrv",
];

/// Ordered list of libraries consumers of the package should link against.
/// Static metadata, not computed from the build outputs.
pub const PACKAGE_LIBS: &[&str] = &[
    "Com",
    "ca",
    "cas",
    "dbCore",
    "dbRecStd",
    "gdd",
    "nt",
    "pvAccess",
    "pvaClient",
    "pvaSrv",
    "pvMB",
    "pvDatabase",
    "pvData",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_names_derive_from_dir() {
        assert_eq!(BASE.archive_name(), "base-3.16.1.tar.gz");
        assert_eq!(V4.archive_name(), "EPICS-CPP-4.6.0.tar.gz");
    }

    #[test]
    fn test_hashes_are_sha256_hex() {
        for d in [BASE, V4] {
            assert_eq!(d.sha256.len(), 64);
            assert!(d.sha256.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_package_libs_start_with_com() {
        // Link order matters to consumers; Com is the root dependency.
        assert_eq!(PACKAGE_LIBS.first(), Some(&"Com"));
        assert_eq!(PACKAGE_LIBS.len(), 13);
    }
}
