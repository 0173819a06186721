//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Mapper Migrate - Convert the SQL in MyBatis mapper files between database dialects
#[derive(Parser, Debug)]
#[command(name = "mapper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write a conversion config file
    ///
    /// Examples:
    ///   mapper init --input ./mybatis_oracle --output ./mybatis_pg
    ///   mapper init --config mapper.json --source oracle --target mysql --input in --output out
    Init {
        /// Config file to create (.toml, .json, .yaml)
        #[arg(short, long, default_value = "mapper.toml")]
        config: PathBuf,

        /// Directory holding the mapper files to convert
        #[arg(long)]
        input: PathBuf,

        /// Directory to write converted files, diffs and the error log to
        #[arg(long)]
        output: PathBuf,

        /// Dialect the statements are written in
        #[arg(long, default_value = "oracle")]
        source: String,

        /// Dialect to convert the statements to
        #[arg(long, default_value = "postgresql")]
        target: String,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List statement blocks without converting anything
    Scan {
        /// Mapper file or directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only list these statement kinds (select, insert, update, delete)
        #[arg(short, long = "kind")]
        kinds: Vec<String>,

        /// Only list the statement with this id
        #[arg(long)]
        id: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Convert every mapper file under the input directory
    Convert(ConvertArgs),
}

/// Options for `mapper convert`; flags override the config file
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConvertArgs {
    /// Config file to read
    #[arg(short, long, default_value = "mapper.toml")]
    pub config: PathBuf,

    /// Input directory
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Source dialect
    #[arg(long)]
    pub source: Option<String>,

    /// Target dialect
    #[arg(long)]
    pub target: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the chat-completions API
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key (defaults to the variable named by transform.api_key_env)
    #[arg(long, hide_env_values = true, env = "MAPPER_API_KEY")]
    pub api_key: Option<String>,

    /// Convert and report without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_convert_overrides() {
        let cli = Cli::parse_from([
            "mapper",
            "convert",
            "--input",
            "in",
            "--target",
            "mysql",
            "--dry-run",
        ]);
        match cli.command {
            Some(Commands::Convert(args)) => {
                assert_eq!(args.config, PathBuf::from("mapper.toml"));
                assert_eq!(args.input, Some(PathBuf::from("in")));
                assert_eq!(args.target.as_deref(), Some("mysql"));
                assert!(args.dry_run);
                assert!(!args.json);
            }
            other => panic!("expected convert, got {other:?}"),
        }
    }

    #[test]
    fn parse_scan_kinds() {
        let cli = Cli::parse_from(["mapper", "scan", "src", "-k", "select", "--kind", "delete"]);
        assert_eq!(
            cli.command,
            Some(Commands::Scan {
                path: PathBuf::from("src"),
                kinds: vec!["select".into(), "delete".into()],
                id: None,
                json: false,
            })
        );
    }

    #[test]
    fn parse_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["mapper", "scan", "--verbose"]);
        assert!(cli.verbose);
    }
}
