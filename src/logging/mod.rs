//! Logging and observability
//!
//! Structured logging through `tracing`, plus a few macros that keep the
//! field names of recurring events consistent across modules.
//!
//! # Example
//!
//! ```no_run
//! use crm_reports::logging::init_logging;
//! use crm_reports::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(section = "clients", "Export requested");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of an export
///
/// ```no_run
/// use crm_reports::log_export_start;
/// use crm_reports::domain::Section;
///
/// log_export_start!(Section::Clients, "folder-1");
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($section:expr, $folder:expr) => {
        tracing::info!(
            section = %$section,
            folder = %$folder,
            "Starting export"
        );
    };
}

/// Log the completion of an export
///
/// ```no_run
/// use crm_reports::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!("1AbC", 42, Duration::from_millis(900));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($file_id:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            file_id = %$file_id,
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// ```no_run
/// use crm_reports::log_error_with_context;
/// use crm_reports::domain::ReportError;
///
/// let error = ReportError::NotFound("sheet".to_string());
/// log_error_with_context!(&error, "Failed to read range");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// ```no_run
/// use crm_reports::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 1000_u64, "rate limited");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request after rate limit"
        );
    };
}
