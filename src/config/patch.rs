//! Declarative text patches over extracted source trees.
//!
//! A patch is a (file, find, replace) triple. Patch sets are applied in
//! order because later patches may assume earlier ones already ran.

use std::path::{Path, PathBuf};

use crate::error::ProvisionError;

/// A single search-and-replace edit against a file inside a source tree.
#[derive(Debug, Clone)]
pub struct Patch {
    /// Target file, relative to the tree root.
    pub file: PathBuf,
    pub find: String,
    pub replace: String,
}

impl Patch {
    pub fn new(
        file: impl Into<PathBuf>,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// Apply a patch set to a source tree, in order.
///
/// Re-applying over an already-patched tree is a no-op: a file that already
/// contains the replacement text counts as patched even when the search text
/// is gone. A file containing neither is a hard `Config` error naming the
/// missing text; a silent no-op there would hide an upstream layout change.
pub fn apply(root: &Path, patches: &[Patch]) -> Result<(), ProvisionError> {
    for patch in patches {
        let path = root.join(&patch.file);
        let text = std::fs::read_to_string(&path).map_err(|e| ProvisionError::Config {
            file: path.clone(),
            reason: format!("cannot read target: {}", e),
        })?;

        if text.contains(&patch.replace) {
            // Already applied. Checked before `find` because the search text
            // can be a substring of the replacement (e.g. flag appends).
            continue;
        }

        if !text.contains(&patch.find) {
            return Err(ProvisionError::Config {
                file: path,
                reason: format!("search text not found: {:?}", patch.find),
            });
        }

        std::fs::write(&path, text.replace(&patch.find, &patch.replace))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replaces_in_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("cfg"), "A = one\nB = two\n").unwrap();

        let patches = [
            Patch::new("cfg", "A = one", "A = 1"),
            Patch::new("cfg", "B = two", "B = 2"),
        ];
        apply(temp_dir.path(), &patches).unwrap();

        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("cfg")).unwrap(),
            "A = 1\nB = 2\n"
        );
    }

    #[test]
    fn test_reapply_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cfg");
        std::fs::write(&path, "FLAGS = -O3\n").unwrap();

        // `find` is a substring of `replace`: the append must not stack.
        let patches = [Patch::new("cfg", "FLAGS = -O3", "FLAGS = -O3 -std=c++11")];
        apply(temp_dir.path(), &patches).unwrap();
        apply(temp_dir.path(), &patches).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "FLAGS = -O3 -std=c++11\n"
        );
    }

    #[test]
    fn test_missing_text_is_config_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("cfg"), "nothing here\n").unwrap();

        let patches = [Patch::new("cfg", "A = one", "A = 1")];
        let err = apply(temp_dir.path(), &patches).unwrap_err();
        assert!(matches!(err, ProvisionError::Config { .. }));
        assert!(err.to_string().contains("A = one"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let patches = [Patch::new("absent", "x", "y")];
        let err = apply(temp_dir.path(), &patches).unwrap_err();
        assert!(matches!(err, ProvisionError::Config { .. }));
        assert!(err.to_string().contains("absent"));
    }
}
