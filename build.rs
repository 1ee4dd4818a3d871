// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe file path
fn recipe_arg() -> Arg {
    Arg::new("recipe")
        .value_name("RECIPE")
        .required(true)
        .help("Path to the recipe file")
}

/// Common argument: config file path
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .help("Path to a config file")
}

fn build_cli() -> Command {
    Command::new("ladle")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Ladle Contributors")
        .about("Minimal recipe-driven installer for prebuilt binary releases")
        .subcommand_required(false)
        .subcommand(
            Command::new("install")
                .about("Install a recipe: fetch, verify, extract, place")
                .arg(recipe_arg())
                .arg(
                    Arg::new("root")
                        .short('r')
                        .long("root")
                        .value_name("DIR")
                        .help("Installation root directory"),
                )
                .arg(config_arg())
                .arg(
                    Arg::new("no_cache")
                        .long("no-cache")
                        .num_args(0)
                        .help("Skip the archive cache"),
                )
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .num_args(0)
                        .help("Show what would be installed without making changes"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Parse and validate a recipe without installing")
                .arg(recipe_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Show a recipe with variables resolved")
                .arg(recipe_arg()),
        )
        .subcommand(
            Command::new("fetch")
                .about("Download and verify a recipe's archive without installing")
                .arg(recipe_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .help("Output path for the archive"),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").value_name("SHELL").required(true)),
        )
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;

    fs::write(out_dir.join("ladle.1"), buffer)?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
