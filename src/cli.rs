// src/cli.rs
//! CLI definitions for the ladle recipe installer
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ladle")]
#[command(author = "Ladle Contributors")]
#[command(version)]
#[command(about = "Minimal recipe-driven installer for prebuilt binary releases", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a recipe: fetch, verify, extract, place
    Install {
        /// Path to the recipe file
        recipe: PathBuf,

        /// Installation root directory
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Path to a config file (default: ~/.config/ladle/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the archive cache
        #[arg(long)]
        no_cache: bool,

        /// Show what would be installed without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse and validate a recipe without installing
    Validate {
        /// Path to the recipe file
        recipe: PathBuf,
    },

    /// Show a recipe with variables resolved
    Show {
        /// Path to the recipe file
        recipe: PathBuf,
    },

    /// Download and verify a recipe's archive without installing
    Fetch {
        /// Path to the recipe file
        recipe: PathBuf,

        /// Output path (default: the archive filename in the current dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a config file (default: ~/.config/ladle/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
