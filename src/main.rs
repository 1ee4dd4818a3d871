// src/main.rs

mod cli;
mod commands;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use ladle::Result;

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Install {
            recipe,
            root,
            config,
            no_cache,
            dry_run,
        }) => commands::cmd_install(&recipe, root, config, no_cache, dry_run),
        Some(Commands::Validate { recipe }) => commands::cmd_validate(&recipe),
        Some(Commands::Show { recipe }) => commands::cmd_show(&recipe),
        Some(Commands::Fetch {
            recipe,
            output,
            config,
        }) => commands::cmd_fetch(&recipe, output, config),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            println!("ladle v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'ladle --help' for usage information");
            Ok(())
        }
    }
}

fn main() {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}
