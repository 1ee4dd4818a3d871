// src/commands.rs
//! Command handlers for the ladle CLI

use ladle::config::Config;
use ladle::fetch::{create_progress_bar, HttpClient};
use ladle::installer::{self, InstallOptions};
use ladle::recipe::{parse_recipe_file, validate_recipe};
use ladle::{checksum, Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Install a recipe into the configured root
pub fn cmd_install(
    recipe_path: &Path,
    root: Option<PathBuf>,
    config_path: Option<PathBuf>,
    no_cache: bool,
    dry_run: bool,
) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let recipe = parse_recipe_file(recipe_path)?;

    let opts = InstallOptions {
        install_root: root.unwrap_or(config.install_root),
        cache_dir: config.cache_dir,
        no_cache,
        http_timeout: Duration::from_secs(config.http_timeout_secs),
        dry_run,
    };

    let report = installer::install(&recipe, &opts)?;

    if dry_run {
        println!(
            "Would install {} {} ({} step(s)) under {}",
            report.name,
            report.version,
            recipe.install_steps.len(),
            opts.install_root.display()
        );
        return Ok(());
    }

    println!("Installed {} {}", report.name, report.version);
    for path in &report.installed {
        println!("  {}", path.display());
    }
    if report.from_cache {
        println!("  (archive from local cache)");
    }
    Ok(())
}

/// Parse and validate a recipe, printing warnings
pub fn cmd_validate(recipe_path: &Path) -> Result<()> {
    let recipe = parse_recipe_file(recipe_path)?;
    let warnings = validate_recipe(&recipe)?;

    println!(
        "Recipe OK: {} {}",
        recipe.package.name, recipe.package.version
    );
    for warning in &warnings {
        println!("  warning: {}", warning);
    }
    Ok(())
}

/// Print a recipe with its variables resolved
pub fn cmd_show(recipe_path: &Path) -> Result<()> {
    let recipe = parse_recipe_file(recipe_path)?;

    println!("name:     {}", recipe.package.name);
    println!("version:  {}", recipe.package.version);
    if let Some(description) = &recipe.package.description {
        println!("summary:  {}", description);
    }
    if let Some(homepage) = &recipe.package.homepage {
        println!("homepage: {}", homepage);
    }
    println!("url:      {}", recipe.archive_url());
    match (&recipe.source.sha256, recipe.checksum_url()) {
        (Some(digest), _) => println!("sha256:   {}", digest),
        (None, Some(url)) => println!("sha256:   (from {})", url),
        (None, None) => println!("sha256:   (missing)"),
    }
    for step in &recipe.install_steps {
        println!("install:  {} -> {}/", step.source, step.dest);
    }
    Ok(())
}

/// Download and verify a recipe's archive without installing it
pub fn cmd_fetch(
    recipe_path: &Path,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let recipe = parse_recipe_file(recipe_path)?;
    validate_recipe(&recipe)?;

    let client = HttpClient::with_timeout(Duration::from_secs(config.http_timeout_secs))?;
    let expected = client.resolve_expected_sha256(&recipe)?;

    let filename = recipe.archive_filename();
    let dest = output.unwrap_or_else(|| PathBuf::from(&filename));

    let pb = create_progress_bar(&filename);
    client.fetch_to_file(&recipe.archive_url(), &dest, &filename, Some(&pb))?;

    match checksum::verify_file(&dest, &expected)
        .map_err(|e| Error::IoError(format!("Failed to hash {}: {}", dest.display(), e)))?
    {
        Ok(()) => {
            info!("Verified {} against {}", dest.display(), expected);
            println!("Fetched and verified {}", dest.display());
            Ok(())
        }
        Err(mismatch) => {
            // Do not leave an unverified archive lying around
            let _ = std::fs::remove_file(&dest);
            Err(Error::IntegrityError {
                expected: mismatch.expected,
                actual: mismatch.actual,
            })
        }
    }
}
