// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files describing one prebuilt binary release. Unlike a
//! build recipe there is no build section: the archive already contains the
//! final binaries and install steps just name what to copy where.

use serde::{Deserialize, Serialize};

/// A complete recipe for installing a prebuilt release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Archive location and integrity info
    pub source: SourceSection,

    /// Ordered install steps, applied after extraction
    #[serde(rename = "install", default)]
    pub install_steps: Vec<InstallStep>,
}

impl Recipe {
    /// Substitute recipe variables in a template string
    ///
    /// Replaces `%(version)s` and `%(name)s` with the values from the
    /// package section.
    pub fn substitute(&self, template: &str) -> String {
        template
            .replace("%(version)s", &self.package.version)
            .replace("%(name)s", &self.package.name)
    }

    /// Get the archive URL with variables substituted
    pub fn archive_url(&self) -> String {
        self.substitute(&self.source.url)
    }

    /// Get the archive filename from the URL
    ///
    /// Used for checksum-file lookups and cache display names.
    pub fn archive_filename(&self) -> String {
        self.archive_url()
            .split('/')
            .next_back()
            .unwrap_or("archive.tar.gz")
            .to_string()
    }

    /// Get the checksum-file URL with variables substituted, if declared
    pub fn checksum_url(&self) -> Option<String> {
        self.source.sha256_url.as_ref().map(|u| self.substitute(u))
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Logical package name
    pub name: String,

    /// Version tag (semantic or free-form)
    pub version: String,

    /// Human-readable summary
    #[serde(default)]
    pub description: Option<String>,

    /// Homepage URL (informational)
    #[serde(default)]
    pub homepage: Option<String>,
}

/// Archive source section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// Release archive URL
    ///
    /// Supports `%(version)s` and `%(name)s` substitution.
    /// Example: `https://example.com/tool_%(version)s_linux_amd64.tar.gz`
    pub url: String,

    /// Expected SHA-256 digest of the archive (64 hex chars)
    #[serde(default)]
    pub sha256: Option<String>,

    /// URL of a coreutils-style checksum file to resolve the digest from
    ///
    /// Mutually exclusive with `sha256`. The archive filename is looked up
    /// in the fetched file.
    #[serde(default)]
    pub sha256_url: Option<String>,
}

/// One install step: copy a file out of the extracted archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallStep {
    /// Path of the file inside the archive (exact, or unique suffix)
    pub source: String,

    /// Destination directory, relative to the install root
    pub dest: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            package: PackageSection {
                name: "replicated".to_string(),
                version: "0.106.0".to_string(),
                description: None,
                homepage: None,
            },
            source: SourceSection {
                url: "https://example.com/%(name)s_%(version)s_linux_amd64.tar.gz".to_string(),
                sha256: Some("a".repeat(64)),
                sha256_url: None,
            },
            install_steps: vec![InstallStep {
                source: "replicated".to_string(),
                dest: "bin".to_string(),
            }],
        }
    }

    #[test]
    fn test_substitute_version_and_name() {
        let recipe = sample();
        assert_eq!(
            recipe.archive_url(),
            "https://example.com/replicated_0.106.0_linux_amd64.tar.gz"
        );
    }

    #[test]
    fn test_archive_filename() {
        let recipe = sample();
        assert_eq!(
            recipe.archive_filename(),
            "replicated_0.106.0_linux_amd64.tar.gz"
        );
    }

    #[test]
    fn test_checksum_url_substitution() {
        let mut recipe = sample();
        recipe.source.sha256 = None;
        recipe.source.sha256_url =
            Some("https://example.com/v%(version)s/checksums.txt".to_string());
        assert_eq!(
            recipe.checksum_url().as_deref(),
            Some("https://example.com/v0.106.0/checksums.txt")
        );
    }
}
