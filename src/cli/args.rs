//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// apiflow - Discover, assess, document, and generate clients for APIs.
#[derive(Debug, Parser)]
#[command(name = "apiflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default .apiflow/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show per-stage progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pipeline (default if no command specified)
    Run(RunArgs),

    /// List pipeline stages and their routing rules
    Stages(StagesArgs),

    /// Show resolved configuration
    Config(ConfigArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// SDK languages to generate (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Overall run budget in seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Directory for the report and generated artifacts
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Do not write anything to disk
    #[arg(long)]
    pub no_write: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `stages` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StagesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON instead of YAML
    #[arg(long)]
    pub json: bool,

    /// Print the JSON Schema of the config file instead
    #[arg(long)]
    pub schema: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_no_args() {
        let cli = Cli::try_parse_from(["apiflow"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_parses_run_with_languages() {
        let cli =
            Cli::try_parse_from(["apiflow", "run", "--languages", "python,java", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.languages, vec!["python", "java"]);
                assert!(args.json);
                assert!(!args.no_write);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn cli_parses_deadline_and_output() {
        let cli = Cli::try_parse_from(["apiflow", "run", "--deadline", "30", "-o", "out"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.deadline, Some(30));
                assert_eq!(args.output, Some(PathBuf::from("out")));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn cli_rejects_non_numeric_deadline() {
        assert!(Cli::try_parse_from(["apiflow", "run", "--deadline", "soon"]).is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["apiflow", "stages", "--verbose", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Some(Commands::Stages(_))));
    }

    #[test]
    fn cli_parses_config_schema() {
        let cli = Cli::try_parse_from(["apiflow", "config", "--schema"]).unwrap();
        match cli.command {
            Some(Commands::Config(args)) => assert!(args.schema),
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
