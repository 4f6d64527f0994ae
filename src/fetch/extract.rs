//! Native tar.gz extraction.
//!
//! Both distributions ship as gzipped tarballs; nothing else needs to be
//! supported. Extraction rejects entries that could write outside the
//! destination (absolute paths, `..` components, links escaping the tree).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use crate::error::ProvisionError;

/// Extract a tar.gz archive into `dest`.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), ProvisionError> {
    let wrap = |reason: String| ProvisionError::Extraction {
        archive: archive.to_path_buf(),
        reason,
    };

    std::fs::create_dir_all(dest)?;

    let file = File::open(archive).map_err(|e| wrap(format!("cannot open archive: {}", e)))?;
    let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
    extract_entries(decoder, dest).map_err(wrap)
}

fn extract_entries<R: Read>(reader: R, dest: &Path) -> Result<(), String> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries().map_err(|e| format!("tar read error: {}", e))? {
        let mut entry = entry.map_err(|e| format!("tar entry error: {}", e))?;

        let path = entry
            .path()
            .map_err(|e| format!("tar path error: {}", e))?
            .into_owned();

        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return Err(format!("tar contains unsafe path: {}", path.display()));
        }

        // Some archives contain a "." entry; treat it as a no-op.
        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let full_path = dest.join(&path);

        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let link_name = entry
                .link_name()
                .map_err(|e| format!("tar link_name error: {}", e))?
                .ok_or_else(|| format!("tar link without target: {}", path.display()))?;
            let link_parent = full_path.parent().unwrap_or(dest);
            check_link_target(dest, link_parent, &link_name)?;
        }

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create directory {}: {}", parent.display(), e))?;
        }

        entry
            .unpack(&full_path)
            .map_err(|e| format!("unpack error for {}: {}", path.display(), e))?;
    }

    Ok(())
}

/// Reject link targets that are absolute or resolve outside `dest`.
fn check_link_target(dest: &Path, link_parent: &Path, link_name: &Path) -> Result<(), String> {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(format!(
            "tar contains unsafe link target (absolute): {}",
            link_name.display()
        ));
    }

    let candidate = normalize_lexical(&link_parent.join(link_name));
    if candidate.strip_prefix(normalize_lexical(dest)).is_err() {
        return Err(format!(
            "tar contains unsafe link target (escapes dest): {}",
            link_name.display()
        ));
    }

    Ok(())
}

/// Lexically normalize a path without touching the filesystem, so link
/// targets can be validated before anything is unpacked.
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
            }
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    out
}
