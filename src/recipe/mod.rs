// src/recipe/mod.rs

//! Recipe handling: format definitions, parsing, validation
//!
//! A recipe is a small TOML file describing one prebuilt release: where the
//! archive lives, what its SHA-256 digest is, and which files to copy into
//! the install root after extraction.
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "replicated"
//! description = "CLI for the Replicated vendor platform"
//! homepage = "https://docs.replicated.com/"
//! version = "0.106.0"
//!
//! [source]
//! url = "https://example.com/replicated_%(version)s_linux_amd64.tar.gz"
//! sha256 = "64 hex chars"
//!
//! [[install]]
//! source = "replicated"
//! dest = "bin"
//! ```

pub mod format;
pub mod parser;

pub use format::{InstallStep, PackageSection, Recipe, SourceSection};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
