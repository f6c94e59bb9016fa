//! Settings command implementation
//!
//! Shows and edits the persisted credential settings: destination folder,
//! service-account key and OAuth client secret.

use super::{load_validated, report_failure};
use crate::core::settings::{CredentialConfig, CredentialKind, SettingsStore};
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Arguments for the settings command
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

/// Settings actions
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the saved settings
    Show,

    /// Change saved settings; fields not given keep their value
    Set {
        /// Drive folder new reports are moved into
        #[arg(long)]
        folder_id: Option<String>,

        /// Service-account key file (.json)
        #[arg(long)]
        credentials_path: Option<String>,

        /// OAuth client-secret file (.json)
        #[arg(long)]
        client_secret_path: Option<String>,

        /// Replace the whole record instead of merging; fields not given are cleared
        #[arg(long)]
        replace: bool,
    },

    /// Copy a credential file into the credentials directory and use it
    Import {
        /// Kind of credential file
        #[arg(value_enum)]
        kind: CredentialArg,

        /// File to import
        path: PathBuf,
    },
}

/// Credential file kinds accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CredentialArg {
    ServiceAccount,
    ClientSecret,
}

impl From<CredentialArg> for CredentialKind {
    fn from(arg: CredentialArg) -> Self {
        match arg {
            CredentialArg::ServiceAccount => CredentialKind::ServiceAccount,
            CredentialArg::ClientSecret => CredentialKind::ClientSecret,
        }
    }
}

impl SettingsArgs {
    /// Execute the settings command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_validated(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = match SettingsStore::from_config(&config.settings).await {
            Ok(s) => s,
            Err(e) => return Ok(report_failure("Failed to open settings", &e)),
        };

        let outcome = match &self.action {
            SettingsAction::Show => Ok(store.get().await),
            SettingsAction::Set {
                folder_id,
                credentials_path,
                client_secret_path,
                replace,
            } => {
                let patch = CredentialConfig {
                    folder_id: folder_id.clone(),
                    credentials_path: credentials_path.clone(),
                    client_secret_path: client_secret_path.clone(),
                };
                if *replace {
                    store.save(patch).await
                } else {
                    store.update(patch).await
                }
            }
            SettingsAction::Import { kind, path } => {
                store.import_credential((*kind).into(), path).await
            }
        };

        match outcome {
            Ok(current) => {
                if !matches!(self.action, SettingsAction::Show) {
                    println!("✅ Settings saved to {}", store.path().display());
                    println!();
                }
                print_settings(&current);
                Ok(0)
            }
            Err(e) => Ok(report_failure("Settings were not changed", &e)),
        }
    }
}

fn print_settings(config: &CredentialConfig) {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());
    println!("  folder_id:          {}", show(&config.folder_id));
    println!("  credentials_path:   {}", show(&config.credentials_path));
    println!("  client_secret_path: {}", show(&config.client_secret_path));
}
