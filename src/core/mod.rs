//! Core business logic for crm-reports.
//!
//! # Modules
//!
//! - [`settings`] - Persisted credential settings and credential-file validation
//! - [`report`] - Section records to header and value rows
//! - [`export`] - One export end to end: create, write, format, place
//! - [`catalog`] - Listing of previously exported reports
//! - [`service`] - Facade wiring the above for callers
//!
//! # Export Workflow
//!
//! 1. **Resolve folder**: caller override, saved `folder_id`, configured default
//! 2. **Fetch records**: bounded by `export.max_records`
//! 3. **Build rows**: header plus one row per record
//! 4. **Create**: a new spreadsheet titled `CRM Report <Section> <timestamp>`
//! 5. **Write and format**: values at `A1`, header styling, status colors, column widths
//! 6. **Place**: move the file into the destination folder
//!
//! # Example
//!
//! ```rust,no_run
//! use crm_reports::config::load_config;
//! use crm_reports::core::service::ReportService;
//! use crm_reports::domain::Section;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("crm-reports.toml")?;
//! let service = ReportService::from_config(&config).await?;
//!
//! let result = service.export(Section::Clients, None).await?;
//! println!("{} rows at {}", result.record_count, result.web_view_link);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod export;
pub mod report;
pub mod service;
pub mod settings;
