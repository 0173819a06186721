//! Init command implementation
//!
//! Writes a conversion config file with the given directories and dialects.

use std::path::{Path, PathBuf};

use colored::Colorize;

use mapper_core::ConversionConfig;
use mapper_fs::NormalizedPath;
use mapper_transform::Dialect;

use super::resolve;
use crate::error::{CliError, Result};

/// Settings for a new config file
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub config: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub source: String,
    pub target: String,
    pub force: bool,
}

/// Run the init command
pub fn run_init(cwd: &Path, options: &InitOptions) -> Result<()> {
    let path = NormalizedPath::new(resolve(cwd, &options.config));
    println!(
        "{} Writing conversion config to {}...",
        "=>".blue().bold(),
        path.as_str().cyan()
    );

    let config = write_config(&path, options)?;

    println!(
        "   {} -> {}",
        config.source_dialect.display_name().yellow(),
        config.target_dialect.display_name().yellow()
    );
    println!("   Input:  {}", config.input_dir.display());
    println!("   Output: {}", config.output_dir.display());
    println!(
        "   API key is read from {}",
        config.transform.api_key_env.cyan()
    );
    println!("{} Config written!", "OK".green().bold());
    Ok(())
}

/// Build the config from `options` and save it to `path`.
///
/// An existing file is only replaced when `force` is set.
pub fn write_config(path: &NormalizedPath, options: &InitOptions) -> Result<ConversionConfig> {
    if path.exists() && !options.force {
        return Err(CliError::user(format!(
            "{} already exists (use --force to overwrite)",
            path
        )));
    }

    let source: Dialect = options.source.parse()?;
    let target: Dialect = options.target.parse()?;
    if source == target {
        return Err(CliError::user(format!(
            "Source and target dialect are both '{}'",
            source
        )));
    }

    let config = ConversionConfig::new(source, target, &options.input, &options.output);
    config.save(path)?;
    tracing::debug!(path = %path, "saved conversion config");
    Ok(config)
}
