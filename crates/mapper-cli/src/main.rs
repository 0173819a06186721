//! Mapper Migrate CLI
//!
//! The command-line interface for converting MyBatis mapper SQL between
//! database dialects.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Mapper Migrate", "mapper".green().bold());
            println!();
            println!("Run {} for available commands.", "mapper --help".cyan());
            Ok(())
        }
    }
}

/// Log to stderr so stdout stays clean for `--json` output.
///
/// `RUST_LOG` wins over the defaults when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init {
            config,
            input,
            output,
            source,
            target,
            force,
        } => {
            let cwd = std::env::current_dir()?;
            commands::run_init(
                &cwd,
                &commands::InitOptions {
                    config,
                    input,
                    output,
                    source,
                    target,
                    force,
                },
            )
        }
        Commands::Scan {
            path,
            kinds,
            id,
            json,
        } => commands::run_scan(&path, &kinds, id.as_deref(), json),
        Commands::Convert(args) => {
            let cwd = std::env::current_dir()?;
            commands::run_convert(&cwd, &args)
        }
    }
}
