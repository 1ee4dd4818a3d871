// src/recipe/parser.rs

//! Recipe file parsing and validation

use crate::checksum::is_valid_sha256_hex;
use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use std::path::{Component, Path};

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::IoError(format!("Failed to read recipe file {}: {}", path.display(), e))
    })?;

    parse_recipe(&content)
}

/// True when a URL points at a loopback address
fn host_is_loopback(parsed: &url::Url) -> bool {
    match parsed.host() {
        Some(url::Host::Domain(d)) => d == "localhost",
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Check that an install path is relative and cannot traverse upward
///
/// Applies to both sides of a step: `source` within the extracted archive
/// and `dest` under the install root.
fn step_path_is_safe(path: &str) -> bool {
    !Path::new(path).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Validate a recipe for completeness and correctness
///
/// Hard problems (empty name/version, bad checksum, unusable install steps)
/// are errors; cosmetic gaps come back as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ParseError("Recipe package name cannot be empty".to_string()));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ParseError("Recipe package version cannot be empty".to_string()));
    }

    // Exactly one checksum source
    match (&recipe.source.sha256, &recipe.source.sha256_url) {
        (None, None) => {
            return Err(Error::ParseError(
                "Recipe must declare either sha256 or sha256_url".to_string(),
            ));
        }
        (Some(_), Some(_)) => {
            return Err(Error::ParseError(
                "sha256 and sha256_url are mutually exclusive".to_string(),
            ));
        }
        (Some(digest), None) => {
            if !is_valid_sha256_hex(digest) {
                return Err(Error::ParseError(format!(
                    "Invalid sha256 digest: expected 64 hex chars, got {:?}",
                    digest
                )));
            }
        }
        (None, Some(_)) => {}
    }

    // Archive URL must be well-formed and HTTPS (plain http is tolerated
    // for loopback hosts only, e.g. a local mirror)
    let archive_url = recipe.archive_url();
    match url::Url::parse(&archive_url) {
        Ok(parsed) if parsed.scheme() == "https" => {}
        Ok(parsed) if parsed.scheme() == "http" && host_is_loopback(&parsed) => {}
        Ok(parsed) => {
            return Err(Error::ParseError(format!(
                "Archive URL must use https, got {}",
                parsed.scheme()
            )));
        }
        Err(e) => {
            return Err(Error::ParseError(format!(
                "Invalid archive URL {:?}: {}",
                archive_url, e
            )));
        }
    }

    if recipe.install_steps.is_empty() {
        return Err(Error::ParseError(
            "Recipe must declare at least one [[install]] step".to_string(),
        ));
    }
    for step in &recipe.install_steps {
        if step.source.is_empty() {
            return Err(Error::ParseError("Install step source cannot be empty".to_string()));
        }
        if !step_path_is_safe(&step.source) {
            return Err(Error::ParseError(format!(
                "Install source {:?} must be relative and must not traverse upward",
                step.source
            )));
        }
        if !step_path_is_safe(&step.dest) {
            return Err(Error::ParseError(format!(
                "Install destination {:?} must be relative and must not traverse upward",
                step.dest
            )));
        }
    }

    if recipe.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }
    match &recipe.package.homepage {
        None => warnings.push("Missing package homepage".to_string()),
        Some(homepage) => {
            if url::Url::parse(homepage).is_err() {
                warnings.push(format!("Homepage is not a valid URL: {}", homepage));
            }
        }
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[package]
name = "replicated"
description = "CLI for the Replicated vendor platform"
homepage = "https://docs.replicated.com/"
version = "0.106.0"

[source]
url = "https://example.com/replicated_%(version)s_linux_amd64.tar.gz"
sha256 = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"

[[install]]
source = "replicated"
dest = "bin"
"#;

    #[test]
    fn test_parse_valid_recipe() {
        let recipe = parse_recipe(VALID).unwrap();
        assert_eq!(recipe.package.name, "replicated");
        assert_eq!(recipe.install_steps.len(), 1);
        assert!(validate_recipe(&recipe).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_recipe("this is not valid toml at all {}").unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_validate_empty_name() {
        let recipe = parse_recipe(&VALID.replace("\"replicated\"", "\"\"")).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_bad_digest_length() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.source.sha256 = Some("abc123".to_string());
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_missing_checksum() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.source.sha256 = None;
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_both_checksum_sources() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.source.sha256_url = Some("https://example.com/checksums.txt".to_string());
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_rejects_http_url() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.source.url = "http://example.com/tool.tar.gz".to_string();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_allows_loopback_http() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.source.url = "http://127.0.0.1:8080/tool.tar.gz".to_string();
        assert!(validate_recipe(&recipe).is_ok());

        recipe.source.url = "http://localhost:8080/tool.tar.gz".to_string();
        assert!(validate_recipe(&recipe).is_ok());
    }

    #[test]
    fn test_validate_no_install_steps() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.install_steps.clear();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_traversing_dest() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.install_steps[0].dest = "../outside".to_string();
        assert!(validate_recipe(&recipe).is_err());

        recipe.install_steps[0].dest = "/etc".to_string();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_traversing_source() {
        let mut recipe = parse_recipe(VALID).unwrap();
        recipe.install_steps[0].source = "../outside".to_string();
        assert!(validate_recipe(&recipe).is_err());

        recipe.install_steps[0].source = "/etc/passwd".to_string();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_warnings_for_missing_metadata() {
        let minimal = r#"
[package]
name = "tool"
version = "1.0"

[source]
url = "https://example.com/tool.tar.gz"
sha256 = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"

[[install]]
source = "tool"
dest = "bin"
"#;
        let recipe = parse_recipe(minimal).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("homepage")));
    }
}
