//! Configuration management for crm-reports.
//!
//! TOML-based configuration loading, parsing and validation.
//!
//! # Overview
//!
//! The configuration file supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CRM_REPORTS_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! Credential paths and the destination folder are not part of this file;
//! they live in the settings record managed by
//! [`SettingsStore`](crate::core::settings::SettingsStore).
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [google.retry]
//! max_attempts = 3
//! initial_delay_ms = 500
//!
//! [settings]
//! path = "config/google_export_settings.json"
//!
//! [export]
//! max_records = 2000
//! default_folder_id = "${CRM_REPORTS_FOLDER}"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use crm_reports::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("crm-reports.toml")?;
//! println!("Settings file: {}", config.settings.path);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfig, GoogleConfig, LoggingConfig, RecordsConfig, ReportsConfig,
    RetryConfig, SettingsConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
