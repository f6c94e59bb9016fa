//! Validate config command implementation
//!
//! This module implements the `validate-config` command. Besides the TOML
//! file it checks the saved settings and the credential files they name.

use super::{load_validated, report_failure};
use crate::core::settings::{validate_credential_file, SettingsStore};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_validated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Sheets API: {}", config.google.sheets_base_url);
        println!("  Drive API: {}", config.google.drive_base_url);
        println!("  Value Input: {}", config.google.value_input_option);
        println!("  Retry Attempts: {}", config.google.retry.max_attempts);
        println!("  Settings File: {}", config.settings.path);
        println!("  Records Directory: {}", config.records.data_dir);
        println!("  Max Records: {}", config.export.max_records);
        println!();

        let store = match SettingsStore::from_config(&config.settings).await {
            Ok(s) => s,
            Err(e) => return Ok(report_failure("Failed to open settings", &e)),
        };
        let settings = store.get().await;

        if !settings.has_credentials() {
            println!("⚠️  No credential file configured");
            println!("   Run 'crm-reports settings import service-account <file>' before exporting");
            println!();
            return Ok(0);
        }

        for (field, path) in [
            ("credentials_path", &settings.credentials_path),
            ("client_secret_path", &settings.client_secret_path),
        ] {
            if let Some(path) = path {
                if let Err(e) = validate_credential_file(field, path).await {
                    return Ok(report_failure("Credential file check failed", &e));
                }
                println!("✅ {field}: {path}");
            }
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_validates_config_without_credentials() {
        let dir = TempDir::new().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[settings]\npath = \"{}\"",
            dir.path().join("s.json").display()
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_exits_with_two() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[export]\nmax_records = 0").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
