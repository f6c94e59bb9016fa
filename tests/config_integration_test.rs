//! Integration tests for configuration loading and validation
//!
//! Tests that touch environment variables hold `ENV_MUTEX`.

use crm_reports::config::load_config;
use crm_reports::domain::ReportError;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("CRM_REPORTS_APPLICATION_LOG_LEVEL");
    std::env::remove_var("CRM_REPORTS_EXPORT_MAX_RECORDS");
    std::env::remove_var("CRM_REPORTS_EXPORT_DEFAULT_FOLDER_ID");
    std::env::remove_var("CRM_REPORTS_GOOGLE_SHEETS_BASE_URL");
    std::env::remove_var("TEST_CRM_FOLDER");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config(
        r#"
[application]
log_level = "debug"

[google]
sheets_base_url = "http://localhost:1234/v4"
drive_base_url = "http://localhost:1234/drive/v3"
timeout_seconds = 10
value_input_option = "RAW"

[google.retry]
max_attempts = 5
initial_delay_ms = 10
max_delay_ms = 100
backoff_multiplier = 3.0

[settings]
path = "/tmp/crm/settings.json"
credentials_dir = "/tmp/crm"

[export]
max_records = 50
highlight_status = false
auto_resize_columns = false
default_folder_id = "folder-1"

[records]
data_dir = "/var/lib/crm"

[logging]
local_enabled = false
local_path = "/tmp/crm/logs"
local_rotation = "hourly"
local_max_size_mb = 50
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.google.sheets_base_url, "http://localhost:1234/v4");
    assert_eq!(config.google.value_input_option, "RAW");
    assert_eq!(config.google.retry.max_attempts, 5);
    assert_eq!(config.settings.path, "/tmp/crm/settings.json");
    assert_eq!(config.export.max_records, 50);
    assert!(!config.export.highlight_status);
    assert_eq!(config.export.default_folder_id.as_deref(), Some("folder-1"));
    assert_eq!(config.records.data_dir, "/var/lib/crm");
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_empty_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config("");

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.google.sheets_base_url, "https://sheets.googleapis.com/v4");
    assert_eq!(config.google.value_input_option, "USER_ENTERED");
    assert_eq!(config.google.retry.max_attempts, 3);
    assert_eq!(config.settings.path, "config/google_export_settings.json");
    assert_eq!(config.export.max_records, 2000);
    assert!(config.export.highlight_status);
    assert!(config.export.default_folder_id.is_none());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_CRM_FOLDER", "substituted-folder");
    let file = write_config(
        r#"
[export]
# default_folder_id = "${NOT_SET_BUT_COMMENTED}"
default_folder_id = "${TEST_CRM_FOLDER}"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.export.default_folder_id.as_deref(),
        Some("substituted-folder")
    );
    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let file = write_config("[export]\ndefault_folder_id = \"${TEST_CRM_FOLDER}\"\n");

    match load_config(file.path()) {
        Err(ReportError::Configuration(message)) => assert!(message.contains("TEST_CRM_FOLDER")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_env_overrides_win_over_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("CRM_REPORTS_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("CRM_REPORTS_EXPORT_MAX_RECORDS", "10");
    std::env::set_var("CRM_REPORTS_EXPORT_DEFAULT_FOLDER_ID", "env-folder");
    let file = write_config("[application]\nlog_level = \"debug\"\n[export]\nmax_records = 500\n");

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.export.max_records, 10);
    assert_eq!(config.export.default_folder_id.as_deref(), Some("env-folder"));
    cleanup_env_vars();
}

#[test]
fn test_invalid_values_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    for contents in [
        "[export]\nmax_records = 0\n",
        "[google]\nvalue_input_option = \"FORMATTED\"\n",
        "[google]\nsheets_base_url = \"not a url\"\n",
        "[google.retry]\nmax_attempts = 0\n",
        "[settings]\npath = \"settings.yaml\"\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
        "[application]\nlog_level = \"loud\"\n",
    ] {
        let file = write_config(contents);
        assert!(
            matches!(load_config(file.path()), Err(ReportError::Configuration(_))),
            "accepted: {contents}"
        );
    }
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/crm-reports.toml").unwrap_err();
    assert!(err.to_string().contains("crm-reports init"));
}
