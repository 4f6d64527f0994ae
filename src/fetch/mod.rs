//! Source acquisition: download, verify, extract.
//!
//! Each distribution is fetched the same way: download the tarball, check
//! its sha256, unpack it next to the archive, then delete the archive so no
//! stale duplicate data is left behind. The extracted directory is the only
//! persisted signal that acquisition succeeded.
//!
//! Not safe to run twice concurrently for the same build directory; the
//! pipeline is strictly sequential so this never arises in practice.

pub mod download;
pub mod extract;
pub mod hash;

use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::dist::Distribution;
use crate::error::ProvisionError;
use crate::output;

/// Fetch a distribution into the build directory and return the extracted
/// source root.
pub fn fetch(dist: &Distribution, ctx: &Context) -> Result<PathBuf, ProvisionError> {
    std::fs::create_dir_all(&ctx.build_dir)?;

    output::sub_action(&format!("acquire {}-{}", dist.name, dist.version));

    let archive = ctx.build_dir.join(dist.archive_name());
    download::download(dist.url, &archive)?;
    verify_and_extract(&archive, dist.sha256, &ctx.build_dir, dist.dir_name)
}

/// Verify an already-downloaded archive, extract it, and remove it.
///
/// On an integrity mismatch the bad archive is deleted and nothing is
/// extracted, so a corrupted transfer leaves no directory on disk.
pub fn verify_and_extract(
    archive: &Path,
    expected_sha256: &str,
    dest: &Path,
    dir_name: &str,
) -> Result<PathBuf, ProvisionError> {
    if let Err(e) = hash::verify_sha256(archive, expected_sha256) {
        std::fs::remove_file(archive).ok();
        return Err(e);
    }

    extract::extract_tar_gz(archive, dest)?;
    std::fs::remove_file(archive)?;

    let root = dest.join(dir_name);
    if !root.is_dir() {
        return Err(ProvisionError::Extraction {
            archive: archive.to_path_buf(),
            reason: format!("archive did not produce expected directory '{}'", dir_name),
        });
    }

    output::detail(&format!("extracted to {}", root.display()));
    Ok(root)
}
