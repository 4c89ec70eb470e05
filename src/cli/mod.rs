//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Healthport using clap.

pub mod commands;

use crate::config::{load_config, load_default_config, HealthportConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};

/// Healthport - Apple Health export to CSV converter
#[derive(Parser, Debug)]
#[command(name = "healthport")]
#[command(version, about, long_about = None)]
#[command(author = "Healthport Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, env = "HEALTHPORT_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HEALTHPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert export XML files to CSV
    Convert(commands::convert::ConvertArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Loads the configuration file, or defaults plus environment overrides without one
pub fn load_settings(config_path: Option<&str>) -> Result<HealthportConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => load_default_config(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::parse_from(["healthport", "convert"]);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Convert(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["healthport", "--config", "custom.toml", "convert"]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["healthport", "--log-level", "debug", "convert"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_convert_positionals_and_flags() {
        let cli = Cli::parse_from([
            "healthport",
            "convert",
            "apple_health_export",
            "out",
            "--cda",
            "--active-summary",
        ]);
        match cli.command {
            Commands::Convert(args) => {
                assert_eq!(
                    args.input_path.as_deref(),
                    Some(std::path::Path::new("apple_health_export"))
                );
                assert_eq!(
                    args.output_path.as_deref(),
                    Some(std::path::Path::new("out"))
                );
                assert!(args.cda);
                assert!(args.active_summary);
                assert!(!args.flat);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["healthport", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["healthport", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_load_settings_missing_file() {
        assert!(load_settings(Some("does-not-exist.toml")).is_err());
    }
}
