// src/archive.rs

//! Archive extraction into a scoped temporary directory
//!
//! Release archives are tarballs, usually gzip-compressed (`.tar.gz`), with
//! xz and zstd accepted as well. The compression format is taken from the
//! URL suffix with a magic-byte fallback. Extraction lands in a `TempDir`
//! owned by the returned [`ExtractedTree`], so the directory is removed on
//! every exit path once the tree is dropped.

use crate::error::{Error, Result};
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Compression applied to the release tarball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Uncompressed tar
    Tar,
    /// Gzip-compressed tar (.tar.gz, .tgz)
    TarGz,
    /// XZ-compressed tar (.tar.xz)
    TarXz,
    /// Zstandard-compressed tar (.tar.zst)
    TarZst,
}

impl ArchiveFormat {
    /// Detect the format from a URL or filename suffix
    pub fn from_extension(path: &str) -> Option<Self> {
        if path.ends_with(".tar.gz") || path.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if path.ends_with(".tar.xz") {
            Some(Self::TarXz)
        } else if path.ends_with(".tar.zst") || path.ends_with(".tar.zstd") {
            Some(Self::TarZst)
        } else if path.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }

    /// Detect the format from magic bytes
    ///
    /// Magic bytes:
    /// - Gzip: `1f 8b`
    /// - XZ: `fd 37 7a 58 5a 00`
    /// - Zstd: `28 b5 2f fd`
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b {
            Some(Self::TarGz)
        } else if data.len() >= 6 && data[..6] == [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00] {
            Some(Self::TarXz)
        } else if data.len() >= 4 && data[..4] == [0x28, 0xb5, 0x2f, 0xfd] {
            Some(Self::TarZst)
        } else {
            None
        }
    }

    /// Detect from suffix first, falling back to magic bytes
    pub fn detect(name: &str, data: &[u8]) -> Result<Self> {
        Self::from_extension(name)
            .or_else(|| Self::from_magic_bytes(data))
            .ok_or_else(|| {
                Error::ExtractionError(format!("Unrecognized archive format for {}", name))
            })
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::TarGz => "tar+gzip",
            Self::TarXz => "tar+xz",
            Self::TarZst => "tar+zstd",
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Create a decompressing reader for the given format
fn create_decoder<'a, R: Read + 'a>(reader: R, format: ArchiveFormat) -> Result<Box<dyn Read + 'a>> {
    match format {
        ArchiveFormat::Tar => Ok(Box::new(reader)),
        ArchiveFormat::TarGz => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
        ArchiveFormat::TarXz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
        ArchiveFormat::TarZst => {
            let decoder = zstd::Decoder::new(reader).map_err(|e| {
                Error::ExtractionError(format!("Failed to create zstd decoder: {e}"))
            })?;
            Ok(Box::new(decoder))
        }
    }
}

/// An extracted archive rooted in a temporary directory
///
/// Dropping the tree deletes the directory and everything under it.
#[derive(Debug)]
pub struct ExtractedTree {
    dir: TempDir,
}

impl ExtractedTree {
    /// Root of the extracted tree
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Locate a file by exact relative path, or by unique path suffix
    ///
    /// Release tarballs often nest binaries under a versioned top-level
    /// directory, so `helm` should find `linux-amd64/helm`. An ambiguous
    /// suffix is an error rather than a guess. The name must stay inside
    /// the extraction root; `..` and absolute paths are rejected.
    pub fn find(&self, name: &str) -> Result<PathBuf> {
        if !entry_path_is_safe(Path::new(name)) {
            return Err(Error::PlacementError(format!(
                "Install source {:?} escapes the extraction directory",
                name
            )));
        }

        let exact = self.root().join(name);
        if exact.is_file() {
            return Ok(exact);
        }

        let mut matches = Vec::new();
        collect_files(self.root(), &mut matches)?;
        matches.retain(|p| {
            p.strip_prefix(self.root())
                .map(|rel| rel.ends_with(name))
                .unwrap_or(false)
        });

        match matches.len() {
            0 => Err(Error::PlacementError(format!(
                "File {:?} not found in archive",
                name
            ))),
            1 => Ok(matches.remove(0)),
            n => Err(Error::PlacementError(format!(
                "File {:?} is ambiguous in archive ({} matches)",
                name, n
            ))),
        }
    }
}

/// Recursively collect regular files under a directory
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {}", dir.display(), e)))?
    {
        let entry = entry.map_err(|e| Error::IoError(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Check that a tar entry path stays inside the extraction root
fn entry_path_is_safe(path: &Path) -> bool {
    !path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Extract an in-memory archive into a fresh temporary directory
///
/// A truncated or corrupt stream yields `Error::ExtractionError`; the
/// half-written temp directory is removed when the failed attempt drops it.
pub fn extract(data: &[u8], format: ArchiveFormat) -> Result<ExtractedTree> {
    let dir = TempDir::new()
        .map_err(|e| Error::IoError(format!("Failed to create temp directory: {e}")))?;

    debug!(
        "Extracting {} archive ({} bytes) to {}",
        format,
        data.len(),
        dir.path().display()
    );

    let decoder = create_decoder(data, format)?;
    let mut tar = tar::Archive::new(decoder);
    tar.set_preserve_permissions(true);

    let entries = tar
        .entries()
        .map_err(|e| Error::ExtractionError(format!("Failed to read tar stream: {e}")))?;

    let mut count = 0usize;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| Error::ExtractionError(format!("Malformed tar entry: {e}")))?;

        let entry_path = entry
            .path()
            .map_err(|e| Error::ExtractionError(format!("Bad path in tar entry: {e}")))?
            .into_owned();

        if !entry_path_is_safe(&entry_path) {
            return Err(Error::ExtractionError(format!(
                "Archive entry {:?} escapes the extraction directory",
                entry_path
            )));
        }

        entry
            .unpack_in(dir.path())
            .map_err(|e| Error::ExtractionError(format!("Failed to unpack {:?}: {e}", entry_path)))?;
        count += 1;
    }

    if count == 0 {
        return Err(Error::ExtractionError("Archive contains no entries".to_string()));
    }

    debug!("Extracted {} entries", count);
    Ok(ExtractedTree { dir })
}

/// Detect the format and extract in one step
pub fn extract_auto(name: &str, data: &[u8]) -> Result<ExtractedTree> {
    let format = ArchiveFormat::detect(name, data)?;
    extract(data, format)
}
