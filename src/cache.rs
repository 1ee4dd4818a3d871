// src/cache.rs

//! Local cache of verified release archives
//!
//! Archives are stored content-addressed under `<cache_dir>/archives/<sha256>`,
//! so a re-install of the same recipe never touches the network. Entries are
//! re-verified on every hit; a corrupt entry is discarded and treated as a
//! miss.

use crate::checksum;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Archive cache rooted at a directory
pub struct ArchiveCache {
    dir: PathBuf,
}

impl ArchiveCache {
    /// Open (creating if needed) a cache at the given directory
    pub fn open(dir: &Path) -> Result<Self> {
        let dir = dir.join("archives");
        fs::create_dir_all(&dir).map_err(|e| {
            Error::InitError(format!("Failed to create cache directory {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    /// Default cache location: `<user cache dir>/ladle`
    pub fn default_dir() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|d| d.join("ladle"))
            .ok_or_else(|| Error::InitError("Could not determine user cache directory".to_string()))
    }

    /// Path an archive with this digest would live at
    pub fn entry_path(&self, sha256: &str) -> PathBuf {
        self.dir.join(sha256.to_lowercase())
    }

    /// Look up a verified archive by digest
    ///
    /// Returns the archive bytes on a hit. A present-but-corrupt entry is
    /// removed and reported as a miss.
    pub fn get(&self, sha256: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(sha256);
        if !path.is_file() {
            return Ok(None);
        }

        let data = fs::read(&path)
            .map_err(|e| Error::IoError(format!("Failed to read cache entry: {e}")))?;

        match checksum::verify_bytes(&data, sha256) {
            Ok(()) => {
                debug!("Cache hit for {}", sha256);
                Ok(Some(data))
            }
            Err(mismatch) => {
                warn!("Discarding corrupt cache entry {}: {}", path.display(), mismatch);
                let _ = fs::remove_file(&path);
                Ok(None)
            }
        }
    }

    /// Store a verified archive under its digest
    ///
    /// Callers must have verified `data` against `sha256` already; the write
    /// goes through a temp file and rename so concurrent readers never see a
    /// partial entry.
    pub fn put(&self, sha256: &str, data: &[u8]) -> Result<()> {
        let path = self.entry_path(sha256);
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, data)
            .map_err(|e| Error::IoError(format!("Failed to write cache entry: {e}")))?;
        fs::rename(&temp_path, &path)
            .map_err(|e| Error::IoError(format!("Failed to finalize cache entry: {e}")))?;

        debug!("Cached {} ({} bytes)", sha256, data.len());
        Ok(())
    }
}
