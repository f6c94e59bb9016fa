//! Configuration schema types
//!
//! This module defines the configuration structure that maps to
//! `crm-reports.toml`. Every section has defaults, so an empty file is a
//! valid configuration.

use serde::{Deserialize, Serialize};

/// Main configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Google Sheets and Drive endpoints and HTTP behavior
    #[serde(default)]
    pub google: GoogleConfig,

    /// Where the credential settings record lives
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Export behavior
    #[serde(default)]
    pub export: ExportConfig,

    /// Record source used by the command line
    #[serde(default)]
    pub records: RecordsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReportsConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.google.validate()?;
        self.settings.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for throttled remote calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, the first call included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("google.retry.max_attempts must be > 0".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("google.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err("google.retry.initial_delay_ms must be <= max_delay_ms".to_string());
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Google API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Sheets API root, e.g. `https://sheets.googleapis.com/v4`
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,

    /// Drive API root, e.g. `https://www.googleapis.com/drive/v3`
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// How written values are interpreted (USER_ENTERED or RAW)
    #[serde(default = "default_value_input_option")]
    pub value_input_option: String,

    /// Retry policy for rate-limited calls
    #[serde(default)]
    pub retry: RetryConfig,
}

impl GoogleConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("google.sheets_base_url", &self.sheets_base_url),
            ("google.drive_base_url", &self.drive_base_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(format!("{name} '{value}' is not a valid URL"));
            }
        }
        if self.timeout_seconds == 0 {
            return Err("google.timeout_seconds must be > 0".to_string());
        }
        let valid_options = ["USER_ENTERED", "RAW"];
        if !valid_options.contains(&self.value_input_option.as_str()) {
            return Err(format!(
                "Invalid google.value_input_option '{}'. Must be one of: {}",
                self.value_input_option,
                valid_options.join(", ")
            ));
        }
        self.retry.validate()
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            sheets_base_url: default_sheets_base_url(),
            drive_base_url: default_drive_base_url(),
            timeout_seconds: default_timeout_seconds(),
            value_input_option: default_value_input_option(),
            retry: RetryConfig::default(),
        }
    }
}

/// Location of the persisted credential settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// JSON file holding folder id and credential paths
    #[serde(default = "default_settings_path")]
    pub path: String,

    /// Directory imported credential files are copied into
    #[serde(default = "default_credentials_dir")]
    pub credentials_dir: String,
}

impl SettingsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("settings.path cannot be empty".to_string());
        }
        if !self.path.to_lowercase().ends_with(".json") {
            return Err(format!("settings.path '{}' must be a .json file", self.path));
        }
        Ok(())
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
            credentials_dir: default_credentials_dir(),
        }
    }
}

/// Export behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Upper bound on records pulled for one report
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Color status cells after writing
    #[serde(default = "default_true")]
    pub highlight_status: bool,

    /// Fit column widths to content after writing
    #[serde(default = "default_true")]
    pub auto_resize_columns: bool,

    /// Folder used when neither the caller nor the settings name one
    #[serde(default)]
    pub default_folder_id: Option<String>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_records == 0 {
            return Err("export.max_records must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            highlight_status: true,
            auto_resize_columns: true,
            default_folder_id: None,
        }
    }
}

/// Record snapshot location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Directory with `clients.json`, `deals.json` and `tasks.json`
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Maximum log file size in MB
    #[serde(default = "default_local_max_size_mb")]
    pub local_max_size_mb: usize,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_max_size_mb == 0 {
            return Err("logging.local_max_size_mb must be > 0".to_string());
        }

        Ok(())
    }

    /// Console-only logging, used by commands that run before a config is loaded
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            local_path: String::new(),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            local_max_size_mb: default_local_max_size_mb(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_value_input_option() -> String {
    "USER_ENTERED".to_string()
}

fn default_settings_path() -> String {
    "config/google_export_settings.json".to_string()
}

fn default_credentials_dir() -> String {
    "config".to_string()
}

fn default_max_records() -> usize {
    2000
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_local_max_size_mb() -> usize {
    100
}
