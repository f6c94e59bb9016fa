//! # crm-reports - CRM report export to Google Sheets
//!
//! Turns the clients, deals and tasks of a small CRM into formatted Google
//! Sheets reports stored in a Drive folder, and lists the reports already
//! exported.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Settings store, report building, export orchestration, catalog
//! - [`adapters`] - Google Sheets and Drive gateways, in-memory backends, record sources
//! - [`domain`] - Sections, records, cell values, ranges and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crm_reports::config::load_config;
//! use crm_reports::core::service::ReportService;
//! use crm_reports::domain::Section;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("crm-reports.toml")?;
//!     let service = ReportService::from_config(&config).await?;
//!
//!     let result = service.export(Section::Deals, None).await?;
//!     println!("Exported {} deals to {}", result.record_count, result.web_view_link);
//!
//!     for file in service.list_files(Section::Deals).await? {
//!         println!("{} {}", file.id, file.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Credentials
//!
//! Credentials are not part of the TOML configuration. The settings record
//! (`config/google_export_settings.json` by default) names a service-account
//! key, an OAuth client secret carrying a refresh token, or both; the client
//! secret is preferred because files it creates count against the user's
//! own storage quota.
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`]. Errors keep their
//! kind all the way up so callers can tell an authentication problem from a
//! full Drive:
//!
//! ```rust
//! use crm_reports::domain::ReportError;
//!
//! let error = ReportError::missing_credentials("credentials_path");
//! assert!(error.to_string().contains("credentials_path"));
//! assert!(!error.is_retryable());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
