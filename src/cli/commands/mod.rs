//! CLI command implementations
//!
//! Every command returns the process exit code:
//! 0 success, 2 configuration or validation error, 3 authentication,
//! 4 remote service or quota, 5 fatal.

pub mod export;
pub mod init;
pub mod list;
pub mod settings;
pub mod validate;

use crate::config::{load_config, ReportsConfig};
use crate::domain::ReportError;

/// Exit code for a failed operation
pub fn exit_code(error: &ReportError) -> i32 {
    match error {
        ReportError::Configuration(_)
        | ReportError::Validation(_)
        | ReportError::InvalidArgument(_) => 2,
        ReportError::Authentication { .. } => 3,
        ReportError::QuotaExceeded(_)
        | ReportError::RateLimit { .. }
        | ReportError::NotFound(_)
        | ReportError::Remote(_) => 4,
        ReportError::Serialization(_) | ReportError::Io(_) | ReportError::Other(_) => 5,
    }
}

/// Loads and validates the configuration, printing the failure
///
/// On failure the configuration exit code is returned as the error.
pub(crate) fn load_validated(config_path: &str) -> std::result::Result<ReportsConfig, i32> {
    match load_config(config_path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
            println!("❌ Failed to load configuration file");
            println!("   Error: {e}");
            Err(2)
        }
    }
}

/// Prints a failed operation and returns its exit code
pub(crate) fn report_failure(context: &str, error: &ReportError) -> i32 {
    crate::log_error_with_context!(error, context);
    println!("❌ {context}");
    println!("   Error: {error}");
    exit_code(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RemoteError;
    use test_case::test_case;

    #[test_case(ReportError::Validation("bad".into()), 2; "validation")]
    #[test_case(ReportError::missing_credentials("credentials_path"), 3; "authentication")]
    #[test_case(ReportError::QuotaExceeded("full".into()), 4; "quota")]
    #[test_case(ReportError::RateLimit { attempts: 3, message: "slow".into() }, 4; "rate limit")]
    #[test_case(ReportError::Remote(RemoteError::Timeout("t".into())), 4; "remote")]
    #[test_case(ReportError::Io("disk".into()), 5; "io")]
    fn test_exit_codes(error: ReportError, expected: i32) {
        assert_eq!(exit_code(&error), expected);
    }

    #[test]
    fn test_missing_config_file_is_configuration_error() {
        assert_eq!(load_validated("/nonexistent/crm-reports.toml").unwrap_err(), 2);
    }
}
