// src/installer.rs

//! The install pipeline: Recipe -> Fetch -> Verify -> Extract -> Place
//!
//! A strictly linear, single-threaded pipeline with early abort. Each stage
//! failure maps to its own error variant and nothing is retried. No partial
//! state survives a failure: extraction happens in a scoped temp directory
//! and placement is atomic per file.

use crate::archive;
use crate::cache::ArchiveCache;
use crate::checksum;
use crate::error::{Error, Result};
use crate::fetch::HttpClient;
use crate::place::place_files;
use crate::recipe::{validate_recipe, Recipe};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Options controlling one install invocation
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Root directory install destinations are relative to
    pub install_root: PathBuf,

    /// Cache directory; `None` uses the per-user default
    pub cache_dir: Option<PathBuf>,

    /// Skip the archive cache entirely
    pub no_cache: bool,

    /// HTTP timeout for fetches
    pub http_timeout: Duration,

    /// Validate and plan, but fetch and install nothing
    pub dry_run: bool,
}

/// Outcome of a successful install (or dry run)
#[derive(Debug)]
pub struct InstallReport {
    /// Package name from the recipe
    pub name: String,
    /// Package version from the recipe
    pub version: String,
    /// Digest the archive was verified against (empty on a dry run that
    /// could not resolve it without the network)
    pub sha256: String,
    /// Files placed into the install root, in step order
    pub installed: Vec<PathBuf>,
    /// Whether the archive came from the local cache
    pub from_cache: bool,
}

/// Run the install pipeline for a recipe
pub fn install(recipe: &Recipe, opts: &InstallOptions) -> Result<InstallReport> {
    for warning in validate_recipe(recipe)? {
        warn!("{}", warning);
    }

    let url = recipe.archive_url();
    let filename = recipe.archive_filename();

    if opts.dry_run {
        info!(
            "Dry run: would fetch {} and install {} step(s) under {}",
            url,
            recipe.install_steps.len(),
            opts.install_root.display()
        );
        return Ok(InstallReport {
            name: recipe.package.name.clone(),
            version: recipe.package.version.clone(),
            sha256: recipe.source.sha256.clone().unwrap_or_default(),
            installed: Vec::new(),
            from_cache: false,
        });
    }

    let client = HttpClient::with_timeout(opts.http_timeout)?;
    let expected = client.resolve_expected_sha256(recipe)?;

    // Fetch, consulting the cache first
    let cache = if opts.no_cache {
        None
    } else {
        let dir = match &opts.cache_dir {
            Some(dir) => dir.clone(),
            None => ArchiveCache::default_dir()?,
        };
        Some(ArchiveCache::open(&dir)?)
    };

    let (data, from_cache) = match cache.as_ref().map(|c| c.get(&expected)).transpose()? {
        Some(Some(data)) => {
            info!("Using cached archive for {} {}", recipe.package.name, recipe.package.version);
            (data, true)
        }
        _ => {
            info!("Fetching {}", url);
            let data = client.fetch_bytes(&url)?;
            (data, false)
        }
    };

    // Verify before anything touches the filesystem
    checksum::verify_bytes(&data, &expected).map_err(|m| Error::IntegrityError {
        expected: m.expected,
        actual: m.actual,
    })?;
    info!("Verified sha256 {}", expected);

    if let (Some(cache), false) = (cache.as_ref(), from_cache) {
        if let Err(e) = cache.put(&expected, &data) {
            // A failed cache write must not fail the install
            warn!("Could not cache archive: {}", e);
        }
    }

    // Extract into a scoped temp directory; dropped on all paths
    let tree = archive::extract_auto(&filename, &data)?;

    // Place files into the install root
    let installed = place_files(&tree, &recipe.install_steps, &opts.install_root)?;

    info!(
        "Installed {} {} ({} file(s))",
        recipe.package.name,
        recipe.package.version,
        installed.len()
    );

    Ok(InstallReport {
        name: recipe.package.name.clone(),
        version: recipe.package.version.clone(),
        sha256: expected,
        installed,
        from_cache,
    })
}
