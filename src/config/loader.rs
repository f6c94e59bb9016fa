//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ReportsConfig;
use crate::domain::errors::ReportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "CRM_REPORTS_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ReportsConfig
/// 4. Applies environment variable overrides (CRM_REPORTS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use crm_reports::config::loader::load_config;
///
/// let config = load_config("crm-reports.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ReportsConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ReportError::Configuration(format!(
            "Configuration file not found: {} (run `crm-reports init` to create one)",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ReportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<ReportsConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ReportsConfig = toml::from_str(&contents)
        .map_err(|e| ReportError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ReportError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ReportError::Configuration(e.to_string()))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == name) {
                        missing_vars.push(name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ReportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

/// Applies environment variable overrides using the CRM_REPORTS_* prefix
///
/// Variables follow the pattern CRM_REPORTS_<SECTION>_<KEY>, for example
/// CRM_REPORTS_GOOGLE_SHEETS_BASE_URL or CRM_REPORTS_EXPORT_MAX_RECORDS.
/// Unparseable numbers and booleans are ignored.
fn apply_env_overrides(config: &mut ReportsConfig) {
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Some(val) = env("GOOGLE_SHEETS_BASE_URL") {
        config.google.sheets_base_url = val;
    }
    if let Some(val) = env("GOOGLE_DRIVE_BASE_URL") {
        config.google.drive_base_url = val;
    }
    if let Some(val) = env("GOOGLE_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
        config.google.timeout_seconds = val;
    }
    if let Some(val) = env("GOOGLE_VALUE_INPUT_OPTION") {
        config.google.value_input_option = val;
    }
    if let Some(val) = env("GOOGLE_RETRY_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
        config.google.retry.max_attempts = val;
    }

    if let Some(val) = env("SETTINGS_PATH") {
        config.settings.path = val;
    }
    if let Some(val) = env("SETTINGS_CREDENTIALS_DIR") {
        config.settings.credentials_dir = val;
    }

    if let Some(val) = env("EXPORT_MAX_RECORDS").and_then(|v| v.parse().ok()) {
        config.export.max_records = val;
    }
    if let Some(val) = env("EXPORT_HIGHLIGHT_STATUS").and_then(|v| v.parse().ok()) {
        config.export.highlight_status = val;
    }
    if let Some(val) = env("EXPORT_AUTO_RESIZE_COLUMNS").and_then(|v| v.parse().ok()) {
        config.export.auto_resize_columns = val;
    }
    if let Some(val) = env("EXPORT_DEFAULT_FOLDER_ID") {
        config.export.default_folder_id = Some(val).filter(|v| !v.trim().is_empty());
    }

    if let Some(val) = env("RECORDS_DATA_DIR") {
        config.records.data_dir = val;
    }

    if let Some(val) = env("LOGGING_LOCAL_ENABLED").and_then(|v| v.parse().ok()) {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
