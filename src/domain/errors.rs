//! Domain error types
//!
//! This module defines the error hierarchy for the report exporter.
//! Errors are domain-specific and don't expose third-party types; HTTP and
//! client-library failures are mapped into [`RemoteError`] at the adapter edge.

use thiserror::Error;

/// Main report error type
///
/// Each variant corresponds to a failure kind a caller can act on. The
/// gateway and the orchestrator never swallow these; they surface with
/// their specific kind so the caller can render an actionable message.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing, invalid or expired credentials. Never retried.
    #[error("Authentication error: {message}. Hint: {hint}")]
    Authentication { message: String, hint: String },

    /// The destination storage is full
    #[error("Storage quota exceeded: {0}. Free up space in the destination Drive or configure an OAuth client secret so files are owned by a user account")]
    QuotaExceeded(String),

    /// Spreadsheet, sheet, range or folder does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote service kept throttling after all attempts were used
    #[error("Rate limit exceeded after {attempts} attempts: {message}")]
    RateLimit { attempts: usize, message: String },

    /// Malformed range, index, color or value matrix
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Rejected input, e.g. a malformed credential file
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport and protocol errors from the remote services
    #[error("Remote service error: {0}")]
    Remote(#[from] RemoteError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors talking to the spreadsheet and file-storage services that are not
/// one of the actionable kinds above
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Failed to reach the service
    #[error("Failed to connect: {0}")]
    ConnectionFailed(String),

    /// Response body did not match the expected shape
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx) without a more specific mapping
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl ReportError {
    /// Builds an authentication error whose hint names the settings field to fix
    pub fn missing_credentials(field: &str) -> Self {
        ReportError::Authentication {
            message: format!("no usable credentials configured ({field} is not set)"),
            hint: format!("set `{field}` with `crm-reports settings set --{}`", field.replace('_', "-")),
        }
    }

    /// Builds an authentication error with a free-form hint
    pub fn authentication(message: impl Into<String>, hint: impl Into<String>) -> Self {
        ReportError::Authentication {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Returns true for errors that may succeed when the call is repeated
    ///
    /// Only throttling qualifies; every other kind fails immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReportError::RateLimit { .. })
    }

    /// Returns true when the error means the addressed object is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReportError::NotFound(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ReportError {
    fn from(err: toml::de::Error) -> Self {
        ReportError::Configuration(format!("TOML parse error: {err}"))
    }
}
