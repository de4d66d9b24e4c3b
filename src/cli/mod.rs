//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Medstar using clap.

pub mod commands;

use crate::domain::EtlError;
use clap::{Parser, Subcommand};

/// Exit code: the command succeeded
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code: the run completed but rows were rejected or checks failed
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code: configuration could not be loaded or is invalid
pub const EXIT_CONFIG: i32 = 2;
/// Exit code: a store could not be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code: any other failure
pub const EXIT_FATAL: i32 = 5;

/// Medstar - healthcare operational data to star-schema warehouse ETL
#[derive(Parser, Debug)]
#[command(name = "medstar")]
#[command(version, about, long_about = None)]
#[command(author = "Medstar Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "medstar.toml", env = "MEDSTAR_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MEDSTAR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, transform and load the warehouse
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Check warehouse integrity
    Verify(commands::verify::VerifyArgs),

    /// Show row counts of the warehouse tables
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Map an error to the process exit code
pub fn exit_code_for(error: &EtlError) -> i32 {
    let root = match error {
        EtlError::StageFailed { source, .. } => source.as_ref(),
        other => other,
    };

    if root.is_connection() {
        EXIT_CONNECTION
    } else if matches!(root, EtlError::Configuration(_)) {
        EXIT_CONFIG
    } else {
        EXIT_FATAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SourceError, Stage, WarehouseError};
    use test_case::test_case;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["medstar", "run"]);
        assert_eq!(cli.config, "medstar.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["medstar", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["medstar", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_subcommands() {
        assert!(matches!(
            Cli::parse_from(["medstar", "validate-config"]).command,
            Commands::ValidateConfig(_)
        ));
        assert!(matches!(
            Cli::parse_from(["medstar", "verify"]).command,
            Commands::Verify(_)
        ));
        assert!(matches!(
            Cli::parse_from(["medstar", "init"]).command,
            Commands::Init(_)
        ));
    }

    #[test_case(EtlError::Configuration("bad".into()), EXIT_CONFIG ; "configuration")]
    #[test_case(
        SourceError::ConnectionFailed("refused".into()).into(),
        EXIT_CONNECTION
        ; "source connection"
    )]
    #[test_case(
        EtlError::from(WarehouseError::ConnectionFailed("reset".into())).in_stage(Stage::Facts),
        EXIT_CONNECTION ; "connection inside stage"
    )]
    #[test_case(
        EtlError::from(WarehouseError::NotEmpty("dim_date".into())).in_stage(Stage::PrepareTarget),
        EXIT_FATAL ; "stage failure"
    )]
    #[test_case(EtlError::Integrity("dup".into()), EXIT_FATAL ; "integrity")]
    fn test_exit_code_for(error: EtlError, expected: i32) {
        assert_eq!(exit_code_for(&error), expected);
    }
}
