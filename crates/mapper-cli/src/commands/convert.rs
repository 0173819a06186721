//! Convert command implementation
//!
//! Runs the conversion engine over the configured input tree and reports
//! per-document results.

use std::path::Path;

use colored::Colorize;

use mapper_core::{ConversionConfig, ConversionEngine, ConversionOptions, ConversionReport};
use mapper_fs::{MapperPath, NormalizedPath};
use mapper_transform::{ChatCompletionsTransformer, Dialect, Transformer};

use super::resolve;
use crate::cli::ConvertArgs;
use crate::error::{CliError, Result};

const DEFAULT_SOURCE: &str = "oracle";
const DEFAULT_TARGET: &str = "postgresql";

/// Run the convert command
pub fn run_convert(cwd: &Path, args: &ConvertArgs) -> Result<()> {
    let config = build_config(cwd, args)?;
    let api_key = match &args.api_key {
        Some(key) if !key.trim().is_empty() => key.clone(),
        _ => config.api_key_from_env()?,
    };
    let transformer = ChatCompletionsTransformer::new(config.chat_settings(api_key))?;

    if !args.json {
        println!(
            "{} Converting {} -> {} ({}){}",
            "=>".blue().bold(),
            config.source_dialect.display_name().yellow(),
            config.target_dialect.display_name().yellow(),
            config.transform.model.cyan(),
            if args.dry_run { " [dry run]".dimmed().to_string() } else { String::new() }
        );
    }

    let report = convert(config.clone(), &transformer, args.dry_run)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&config, &report);
    }

    if report.success() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} document(s) could not be converted",
            report.failures.len()
        )))
    }
}

/// Load the config file, or build one from flags when it does not exist,
/// then apply the command-line overrides.
pub fn build_config(cwd: &Path, args: &ConvertArgs) -> Result<ConversionConfig> {
    let path = NormalizedPath::new(resolve(cwd, &args.config));

    let mut config = if path.is_file() {
        ConversionConfig::load(&path)?
    } else {
        match (&args.input, &args.output) {
            (Some(input), Some(output)) => {
                tracing::debug!(path = %path, "no config file, using command-line settings");
                ConversionConfig::new(
                    DEFAULT_SOURCE.parse::<Dialect>()?,
                    DEFAULT_TARGET.parse::<Dialect>()?,
                    input,
                    output,
                )
            }
            _ => {
                return Err(CliError::user(format!(
                    "No config file at {}. Run `mapper init` or pass --input and --output.",
                    path
                )));
            }
        }
    };

    if let Some(input) = &args.input {
        config.input_dir = input.clone();
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(source) = &args.source {
        config.source_dialect = source.parse::<Dialect>()?;
    }
    if let Some(target) = &args.target {
        config.target_dialect = target.parse::<Dialect>()?;
    }
    if let Some(model) = &args.model {
        config.transform.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.transform.endpoint = endpoint.clone();
    }

    Ok(config)
}

/// Run the engine with the given transformer.
pub fn convert(
    config: ConversionConfig,
    transformer: &dyn Transformer,
    dry_run: bool,
) -> Result<ConversionReport> {
    let report = ConversionEngine::new(config, transformer)
        .with_options(ConversionOptions { dry_run })
        .run()?;
    Ok(report)
}

fn print_report(config: &ConversionConfig, report: &ConversionReport) {
    println!();
    for document in &report.documents {
        if document.changed {
            let failed = if document.failed_blocks > 0 {
                format!(", {} failed", document.failed_blocks).red().to_string()
            } else {
                String::new()
            };
            println!(
                "  {} {} ({} block(s), {} {}{})",
                "✓".green(),
                document.path,
                document.changed_blocks,
                format!("+{}", document.lines_added).green(),
                format!("-{}", document.lines_removed).red(),
                failed
            );
        } else {
            println!("  {} {}", "-".dimmed(), document.path.dimmed());
        }
    }
    for failure in &report.failures {
        println!("  {} {}: {}", "✗".red(), failure.path, failure.message.red());
    }

    println!();
    println!(
        "{} {} of {} document(s) changed",
        if report.success() { "OK".green().bold() } else { "!!".red().bold() },
        report.changed_documents(),
        report.documents.len() + report.failures.len()
    );
    let (added, removed) = report.line_totals();
    if added + removed > 0 {
        println!(
            "   {} {} statement line(s)",
            format!("+{added}").green(),
            format!("-{removed}").red()
        );
    }
    if report.failed_blocks() > 0 {
        println!(
            "   {} block(s) kept the original SQL behind a failure marker",
            report.failed_blocks().to_string().yellow()
        );
    }
    if !report.dry_run {
        let output = config.output_root();
        println!("   Output: {}", output);
        println!("   Diffs:  {}", output.join(MapperPath::DiffsDir.as_str()));
        if !report.success() {
            println!("   Errors: {}", output.join(MapperPath::ErrorLog.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapper_transform::Result as TransformResult;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args() -> ConvertArgs {
        ConvertArgs {
            config: PathBuf::from("mapper.toml"),
            input: None,
            output: None,
            source: None,
            target: None,
            model: None,
            endpoint: None,
            api_key: None,
            dry_run: false,
            json: false,
        }
    }

    fn upper(sql: &str, _: &Dialect, _: &Dialect) -> TransformResult<String> {
        Ok(sql.to_uppercase())
    }

    #[test]
    fn test_build_config_requires_file_or_flags() {
        let temp = TempDir::new().unwrap();
        let err = build_config(temp.path(), &args()).unwrap_err();
        assert!(err.to_string().contains("mapper init"));
    }

    #[test]
    fn test_build_config_from_flags() {
        let temp = TempDir::new().unwrap();
        let mut a = args();
        a.input = Some(PathBuf::from("in"));
        a.output = Some(PathBuf::from("out"));
        a.target = Some("MySQL".into());

        let config = build_config(temp.path(), &a).unwrap();
        assert_eq!(config.source_dialect.as_str(), "oracle");
        assert_eq!(config.target_dialect.as_str(), "mysql");
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_build_config_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("mapper.toml"));
        ConversionConfig::new("oracle".parse().unwrap(), "postgresql".parse().unwrap(), "a", "b")
            .save(&path)
            .unwrap();

        let mut a = args();
        a.model = Some("local-model".into());
        a.endpoint = Some("http://127.0.0.1:9/v1".into());
        let config = build_config(temp.path(), &a).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("a"));
        assert_eq!(config.transform.model, "local-model");
        assert_eq!(config.transform.endpoint, "http://127.0.0.1:9/v1");
    }

    #[test]
    fn test_convert_with_local_transformer() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(
            input.join("M.xml"),
            "<mapper><select id=\"a\">select 1</select></mapper>",
        )
        .unwrap();

        let config = ConversionConfig::new(
            "oracle".parse().unwrap(),
            "postgresql".parse().unwrap(),
            &input,
            &output,
        );
        let report = convert(config, &upper, false).unwrap();

        assert!(report.success());
        assert_eq!(report.changed_documents(), 1);
        assert_eq!(report.line_totals(), (1, 1));
        let written = std::fs::read_to_string(output.join("M.xml")).unwrap();
        assert_eq!(written, "<mapper><select id=\"a\">SELECT 1</select></mapper>");
        assert!(output.join("__diffs__/M.xml.1.diff").is_file());
    }

    #[test]
    fn test_convert_invalid_config_is_error() {
        let temp = TempDir::new().unwrap();
        let config = ConversionConfig::new(
            "oracle".parse().unwrap(),
            "postgresql".parse().unwrap(),
            temp.path().join("missing"),
            temp.path().join("out"),
        );
        let err = convert(config, &upper, true).unwrap_err();
        assert!(matches!(err, CliError::Core(_)));
    }
}
