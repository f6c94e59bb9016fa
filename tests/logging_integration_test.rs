//! Integration tests for logging functionality

use crm_reports::config::LoggingConfig;
use crm_reports::domain::ReportError;
use crm_reports::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert!(config.local_max_size_mb > 0);
}

#[test]
fn test_console_only_writes_no_files() {
    let config = LoggingConfig::console_only();
    assert!(!config.local_enabled);
}

// One subscriber per process, so installation and the second-install
// failure live in the same test.
#[test]
fn test_file_layer_writes_json_events() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
        local_max_size_mb: 10,
    };

    let guard = init_logging("info", &config).unwrap();
    assert!(log_path.exists());

    // The filter admits this crate's targets only
    tracing::info!(target: "crm_reports::core::export", file_id = "sheet-1", count = 3, "Export completed");
    tracing::info!(target: "unrelated", "Dropped by the filter");

    let err = init_logging("info", &config).err().unwrap();
    assert!(matches!(err, ReportError::Configuration(_)));

    drop(guard);

    let contents: String = std::fs::read_dir(&log_path)
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect();
    let completed = contents
        .lines()
        .find(|line| line.contains("Export completed"))
        .unwrap();
    let event: serde_json::Value = serde_json::from_str(completed).unwrap();
    assert_eq!(event["fields"]["file_id"], "sheet-1");
    assert_eq!(event["fields"]["count"], 3);
    assert!(!contents.contains("Dropped by the filter"));
}

#[test]
fn test_unknown_level_is_rejected() {
    let err = init_logging("verbose", &LoggingConfig::console_only())
        .err()
        .unwrap();
    assert!(err.to_string().contains("verbose"));
}
