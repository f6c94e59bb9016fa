//! External system integrations for crm-reports.
//!
//! This module provides the seams the export core talks through and their
//! implementations:
//!
//! - [`traits`] - [`SpreadsheetGateway`], [`FileStorage`] and [`EntityProvider`]
//! - [`google`] - Google Sheets v4 and Drive v3 over REST with OAuth2 tokens
//! - [`memory`] - In-process spreadsheet service and file store
//! - [`records`] - Record source reading JSON exports of the CRUD layer
//!
//! # Design Pattern
//!
//! Adapters isolate the remote services behind async traits so the core can
//! be exercised with the in-memory backends. The Google gateway and storage
//! share one authorized client:
//!
//! ```rust,no_run
//! use crm_reports::adapters::google;
//! use crm_reports::adapters::SpreadsheetGateway;
//! use crm_reports::config::GoogleConfig;
//! use crm_reports::core::settings::SettingsStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Arc::new(SettingsStore::open("config/google_export_settings.json", "config").await?);
//! let (sheets, _drive) = google::connect_with_settings(&GoogleConfig::default(), settings)?;
//!
//! let created = sheets.create_spreadsheet("Quarterly").await?;
//! println!("{}", created.spreadsheet_id);
//! # Ok(())
//! # }
//! ```

pub mod google;
pub mod memory;
pub mod records;
pub mod traits;

pub use memory::{MemoryEntityProvider, MemoryWorkspace};
pub use records::JsonDirEntityProvider;
pub use traits::{EntityFilter, EntityProvider, FileStorage, SpreadsheetGateway, SPREADSHEET_MIME_TYPE};
