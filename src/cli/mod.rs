//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for crm-reports using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// crm-reports - CRM report export to Google Sheets
#[derive(Parser, Debug)]
#[command(name = "crm-reports")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "crm-reports.toml", env = "CRM_REPORTS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CRM_REPORTS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one section into a new spreadsheet
    Export(commands::export::ExportArgs),

    /// List previously exported reports
    List(commands::list::ListArgs),

    /// Show or change the saved credential settings
    Settings(commands::settings::SettingsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// True for commands that create remote files and may be interrupted midway
    pub fn creates_files(&self) -> bool {
        matches!(self, Commands::Export(args) if !args.dry_run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Section;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["crm-reports", "export", "clients"]);
        assert_eq!(cli.config, "crm-reports.toml");
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.section, Section::Clients);
                assert!(args.folder.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config_and_level() {
        let cli = Cli::parse_from([
            "crm-reports",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "list",
            "all",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_cli_rejects_unknown_section() {
        assert!(Cli::try_parse_from(["crm-reports", "export", "invoices"]).is_err());
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["crm-reports", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_only_real_exports_create_files() {
        let real = Cli::parse_from(["crm-reports", "export", "deals", "--folder", "F1"]);
        let dry = Cli::parse_from(["crm-reports", "export", "deals", "--dry-run"]);
        let init = Cli::parse_from(["crm-reports", "init"]);
        assert!(real.command.creates_files());
        assert!(!dry.command.creates_files());
        assert!(!init.command.creates_files());
    }
}
