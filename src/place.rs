// src/place.rs

//! Placement of extracted files into the install root
//!
//! The final stage of the pipeline: copy each requested file out of the
//! extracted tree into `<install_root>/<dest>/`, keeping the executable bit.
//! Writes go through a temp file and an atomic rename so an existing binary
//! is either the old one or the new one, never a half-written mix.

use crate::archive::ExtractedTree;
use crate::error::{Error, Result};
use crate::recipe::InstallStep;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Validate a destination directory and anchor it under the install root
///
/// Rejects absolute paths and any `..` component rather than trying to
/// resolve them.
fn safe_dest_dir(install_root: &Path, dest: &str) -> Result<PathBuf> {
    let mut resolved = install_root.to_path_buf();

    for component in Path::new(dest).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::PlacementError(format!(
                    "Install destination {:?} escapes the install root",
                    dest
                )));
            }
        }
    }

    Ok(resolved)
}

/// Copy one file into place, preserving permissions, overwriting atomically
fn place_one(source: &Path, dest_dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dest_dir).map_err(|e| {
        Error::PlacementError(format!(
            "Failed to create destination {}: {}",
            dest_dir.display(),
            e
        ))
    })?;

    let final_path = dest_dir.join(file_name);
    let temp_path = dest_dir.join(format!(".{}.tmp", file_name));

    // Copy preserves the source mode, including the executable bit
    fs::copy(source, &temp_path).map_err(|e| {
        Error::PlacementError(format!(
            "Failed to copy {} to {}: {}",
            source.display(),
            temp_path.display(),
            e
        ))
    })?;

    if let Err(e) = fs::rename(&temp_path, &final_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::PlacementError(format!(
            "Failed to move {} into place: {}",
            final_path.display(),
            e
        )));
    }

    debug!("Placed {}", final_path.display());
    Ok(final_path)
}

/// Apply install steps against an extracted tree
///
/// Steps run in recipe order; the first failure aborts and is returned.
/// Returns the paths of the installed files.
pub fn place_files(
    tree: &ExtractedTree,
    steps: &[InstallStep],
    install_root: &Path,
) -> Result<Vec<PathBuf>> {
    let mut placed = Vec::with_capacity(steps.len());

    for step in steps {
        let source = tree.find(&step.source)?;
        let dest_dir = safe_dest_dir(install_root, &step.dest)?;

        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::PlacementError(format!("Install source {:?} has no file name", step.source))
            })?;

        let final_path = place_one(&source, &dest_dir, file_name)?;
        info!(
            "Installed {} -> {}",
            step.source,
            final_path.display()
        );
        placed.push(final_path);
    }

    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{extract, ArchiveFormat};

    fn tree_with(files: &[(&str, u32, &[u8])]) -> ExtractedTree {
        let data = crate::archive::test_util::build_targz(files);
        extract(&data, ArchiveFormat::TarGz).unwrap()
    }

    #[test]
    fn test_place_single_binary() {
        let tree = tree_with(&[("replicated", 0o755, b"#!/bin/sh\n")]);
        let root = tempfile::tempdir().unwrap();

        let steps = vec![InstallStep {
            source: "replicated".to_string(),
            dest: "bin".to_string(),
        }];
        let placed = place_files(&tree, &steps, root.path()).unwrap();

        assert_eq!(placed, vec![root.path().join("bin/replicated")]);
        assert!(placed[0].is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&placed[0]).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111, "executable bit must survive placement");
        }
    }

    #[test]
    fn test_place_multiple_steps_in_order() {
        let tree = tree_with(&[
            ("dist/tool", 0o755, b"bin"),
            ("dist/tool.1", 0o644, b"man page"),
        ]);
        let root = tempfile::tempdir().unwrap();

        let steps = vec![
            InstallStep {
                source: "tool".to_string(),
                dest: "bin".to_string(),
            },
            InstallStep {
                source: "tool.1".to_string(),
                dest: "share/man/man1".to_string(),
            },
        ];
        let placed = place_files(&tree, &steps, root.path()).unwrap();

        assert_eq!(placed.len(), 2);
        assert!(root.path().join("bin/tool").is_file());
        assert!(root.path().join("share/man/man1/tool.1").is_file());
    }

    #[test]
    fn test_place_missing_source() {
        let tree = tree_with(&[("tool", 0o755, b"x")]);
        let root = tempfile::tempdir().unwrap();

        let steps = vec![InstallStep {
            source: "other".to_string(),
            dest: "bin".to_string(),
        }];
        let err = place_files(&tree, &steps, root.path()).unwrap_err();
        assert!(matches!(err, Error::PlacementError(_)));

        // Nothing half-installed
        assert!(!root.path().join("bin").exists());
    }

    #[test]
    fn test_place_overwrites_existing_file() {
        let tree = tree_with(&[("tool", 0o755, b"new version")]);
        let root = tempfile::tempdir().unwrap();
        let bin = root.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("tool"), b"old version").unwrap();

        let steps = vec![InstallStep {
            source: "tool".to_string(),
            dest: "bin".to_string(),
        }];
        place_files(&tree, &steps, root.path()).unwrap();

        assert_eq!(fs::read(bin.join("tool")).unwrap(), b"new version");
        assert!(!bin.join(".tool.tmp").exists());
    }

    #[test]
    fn test_place_rejects_escaping_dest() {
        let tree = tree_with(&[("tool", 0o755, b"x")]);
        let root = tempfile::tempdir().unwrap();

        for dest in ["../outside", "/abs", "a/../../up"] {
            let steps = vec![InstallStep {
                source: "tool".to_string(),
                dest: dest.to_string(),
            }];
            let err = place_files(&tree, &steps, root.path()).unwrap_err();
            assert!(matches!(err, Error::PlacementError(_)), "dest {:?}", dest);
        }
    }

    #[test]
    fn test_place_unusable_destination() {
        let tree = tree_with(&[("tool", 0o755, b"x")]);
        let root = tempfile::tempdir().unwrap();

        // A regular file where the destination directory should go
        fs::write(root.path().join("bin"), b"in the way").unwrap();

        let steps = vec![InstallStep {
            source: "tool".to_string(),
            dest: "bin".to_string(),
        }];
        let err = place_files(&tree, &steps, root.path()).unwrap_err();
        assert!(matches!(err, Error::PlacementError(_)));
    }
}
