//! Result type alias for report operations

use super::errors::ReportError;

/// Result type alias using `ReportError` as the error type
///
/// # Examples
///
/// ```
/// use crm_reports::domain::result::Result;
/// use crm_reports::domain::errors::ReportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ReportError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ReportError>;
