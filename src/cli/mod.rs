//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Satchel using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Satchel - school information system sync tool
#[derive(Parser, Debug)]
#[command(name = "satchel")]
#[command(version, about, long_about = None)]
#[command(author = "Satchel Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "satchel.toml", env = "SATCHEL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SATCHEL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch collections from a vendor and write them to the output directory
    Sync(commands::sync::SyncArgs),

    /// List the collections a vendor exposes
    Collections(commands::collections::CollectionsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VendorKind;

    #[test]
    fn test_cli_parse_sync() {
        let cli = Cli::parse_from(["satchel", "sync", "--vendor", "sentral"]);
        assert_eq!(cli.config, "satchel.toml");
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.vendor, VendorKind::Sentral);
                assert!(args.collection.is_empty());
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_sync_with_collections() {
        let cli = Cli::parse_from([
            "satchel",
            "sync",
            "--vendor",
            "tass_lms",
            "--collection",
            "student-subjects",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.vendor, VendorKind::TassLms);
                assert_eq!(args.collection, vec!["student-subjects".to_string()]);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_vendor() {
        assert!(Cli::try_parse_from(["satchel", "sync", "--vendor", "compass"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["satchel", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["satchel", "--log-level", "debug", "collections"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Collections(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["satchel", "init", "--force"]);
        match cli.command {
            Commands::Init(args) => assert!(args.force),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
