//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Invoke AWS service operations as commands
#[derive(Parser, Debug)]
#[command(name = "awscmd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// AWS region (overrides AWS_REGION and the config file)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Endpoint used for every service (e.g. a local emulator)
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// Named credentials profile
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Additional service definition (YAML), may be repeated
    #[arg(short = 's', long = "service-file", global = true)]
    pub service_files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Invoke a command
    Invoke {
        /// Command name, e.g. Get-EVBRuleList
        command: String,

        /// Parameter binding as Name=Value, may be repeated
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Parameter bindings as a JSON object
        #[arg(long)]
        params_json: Option<String>,

        /// Output selector: `*`, a response field, or `^Parameter`
        #[arg(long)]
        select: Option<String>,

        /// Output the pass-through parameter value
        #[arg(long)]
        pass_thru: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,

        /// Describe the call without making it
        #[arg(long)]
        what_if: bool,

        /// Fetch a single page of a list command
        #[arg(long)]
        no_auto_iteration: bool,

        /// Resume a list command from this token
        #[arg(long)]
        starting_token: Option<String>,
    },

    /// List available commands
    Commands {
        /// Only commands of this service
        #[arg(long)]
        service: Option<String>,
    },

    /// Show a command's operation, parameters and output
    Describe {
        /// Command name
        command: String,
    },

    /// List loaded services
    Services,

    /// Validate a service definition file
    Validate {
        /// Service definition file (YAML)
        file: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invoke() {
        let cli = Cli::try_parse_from([
            "awscmd",
            "--region",
            "eu-west-1",
            "invoke",
            "Get-EVBRuleList",
            "-p",
            "NamePrefix=orders",
            "--param",
            "Limit=5",
            "--select",
            "^NamePrefix",
            "--no-auto-iteration",
        ])
        .unwrap();

        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Invoke {
                command,
                params,
                select,
                no_auto_iteration,
                force,
                ..
            } => {
                assert_eq!(command, "Get-EVBRuleList");
                assert_eq!(params, vec!["NamePrefix=orders", "Limit=5"]);
                assert_eq!(select.as_deref(), Some("^NamePrefix"));
                assert!(no_auto_iteration);
                assert!(!force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "awscmd",
            "services",
            "--format",
            "pretty",
            "-s",
            "a.yaml",
            "-s",
            "b.yaml",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Pretty);
        assert_eq!(cli.service_files.len(), 2);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Services));
    }

    #[test]
    fn test_invoke_requires_command() {
        assert!(Cli::try_parse_from(["awscmd", "invoke"]).is_err());
    }
}
