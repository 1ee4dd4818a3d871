// src/lib.rs

//! Ladle Recipe Installer
//!
//! Minimal installer for prebuilt binary releases, driven by declarative
//! TOML recipes (name, URL, version, sha256, install steps).
//!
//! # Architecture
//!
//! A strictly linear, synchronous pipeline with early abort:
//!
//! Recipe -> Fetch -> Verify -> Extract -> Place
//!
//! - Archives are verified against SHA-256 before extraction
//! - Extraction happens in a scoped temp directory, removed on all paths
//! - Placement preserves the executable bit and overwrites atomically
//! - Verified archives are cached content-addressed for re-installs

pub mod archive;
pub mod cache;
pub mod checksum;
pub mod config;
mod error;
pub mod fetch;
pub mod installer;
pub mod place;
pub mod recipe;

pub use archive::{ArchiveFormat, ExtractedTree};
pub use cache::ArchiveCache;
pub use config::Config;
pub use error::{Error, Result};
pub use fetch::HttpClient;
pub use installer::{install, InstallOptions, InstallReport};
pub use recipe::{parse_recipe, parse_recipe_file, validate_recipe, InstallStep, Recipe};
